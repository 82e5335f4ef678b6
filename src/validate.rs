use regex::Regex;
use std::error::Error;
use std::fmt;

/// Script module names must look like `require()`-able identifiers.
pub fn validate_module_name(name: &str) -> Result<(), InvalidModuleName> {
    let rgx = Regex::new(r"^[a-zA-Z0-9_./-]+$").unwrap();
    if !rgx.is_match(name) {
        Err(InvalidModuleName { name: name.into() })
    } else {
        Ok(())
    }
}

pub struct InvalidModuleName {
    pub name: String,
}

impl Error for InvalidModuleName {
    fn description(&self) -> &str {
        "Invalid module name. Must contain only a-Z, 0-9, _, ., /, or -"
    }
}

impl fmt::Display for InvalidModuleName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&format!("\"{}\". {}", self.name, self.description()))
    }
}

impl fmt::Debug for InvalidModuleName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&format!("\"{}\". {}", self.name, self.description()))
    }
}

/// The fixed set of tone wire-strings.
pub const TONES: &[&str] = &["think", "whisper", "say", "command", "yell"];

pub fn validate_tone(tone: &str) -> Result<(), InvalidTone> {
    if TONES.contains(&tone) {
        Ok(())
    } else {
        Err(InvalidTone { tone: tone.into() })
    }
}

pub struct InvalidTone {
    pub tone: String,
}

impl Error for InvalidTone {
    fn description(&self) -> &str {
        "Invalid tone. Must be one of think, whisper, say, command, yell"
    }
}

impl fmt::Display for InvalidTone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&format!("\"{}\". {}", self.tone, self.description()))
    }
}

impl fmt::Debug for InvalidTone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&format!("\"{}\". {}", self.tone, self.description()))
    }
}
