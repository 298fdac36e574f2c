use clap::{Parser, Subcommand};
use daylist_core::config::{ConfigOverrides, canonical_key};
use daylist_core::model::Section;

#[derive(Parser, Debug)]
#[command(name = "daylist", author, version, about = "Today and tomorrow, one list", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a task
    ///
    /// Example: daylist add read a chapter
    /// Example: daylist add --tomorrow buy milk
    Add {
        text: Vec<String>,
        /// Put the task under tomorrow
        #[arg(long, conflicts_with = "section")]
        tomorrow: bool,
        #[arg(long, short = 's', value_parser = parse_section)]
        section: Option<Section>,
    },
    /// Flip a task between done and not done
    ///
    /// Example: daylist toggle 1
    Toggle { id: i64 },
    /// Delete a task
    ///
    /// Example: daylist delete 2
    Delete { id: i64 },
    /// Show both sections and the progress tracker
    List,
    /// Show total, completed and percent done
    Stats,
    /// Show or save notes
    ///
    /// Example: daylist notes
    /// Example: daylist notes save call the plumber
    Notes {
        #[command(subcommand)]
        action: Option<NotesCommand>,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    /// Print the saved notes
    Show,
    /// Replace the notes with the given text
    Save { text: Vec<String> },
}

impl Command {
    pub fn add_section(tomorrow: bool, section: Option<Section>) -> Section {
        match (tomorrow, section) {
            (true, _) => Section::Tomorrow,
            (false, Some(section)) => section,
            (false, None) => Section::Today,
        }
    }
}

fn parse_section(raw: &str) -> Result<Section, String> {
    raw.parse()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Alias(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field, Some(rest.trim())))
        .unwrap_or((key_raw, None));

    let canonical_field = canonical_key(field);
    if canonical_field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    match canonical_field.as_str() {
        "theme" if remainder.is_some() => Err("theme override cannot have subfields".to_string()),
        "theme" => Ok(ParsedConfigOverride {
            target: ConfigOverrideTarget::Theme,
            value,
        }),
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value,
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
        }
    }
    Ok(overrides)
}

/// Splits an interactive input line into words, honoring double quotes.
pub fn split_command_line(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_quotes => escape = true,
            '"' => in_quotes = !in_quotes,
            ch if ch.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            ch => current.push(ch),
        }
    }

    if in_quotes {
        return Err("unterminated quote in command".to_string());
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}
