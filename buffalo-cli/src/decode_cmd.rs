//! Decode command - print the events behind a share code

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use buffalo_core::{decode, Event, MatchLog, Outcome};

use crate::render::describe_event;

#[derive(Args)]
pub struct DecodeArgs {
    /// Share code to decode
    #[arg(allow_hyphen_values = true)]
    pub code: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct JsonReplay<'a> {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    moves: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Outcome>,
    events: &'a [Event],
}

/// Run decode command. An invalid code is reported, not an error.
pub fn run(args: DecodeArgs) -> Result<()> {
    let decoded = decode(&args.code);
    if let Err(e) = &decoded {
        tracing::debug!("Decode failed: {}", e);
    }

    if args.json {
        println!("{}", format_json(&decoded)?);
    } else {
        print!("{}", format_text(&decoded));
    }
    Ok(())
}

fn format_json(decoded: &Result<MatchLog, buffalo_core::ReplayError>) -> Result<String> {
    let output = match decoded {
        Ok(log) => JsonReplay {
            valid: true,
            error: None,
            moves: log.move_count(),
            result: log.outcome(),
            events: log.events(),
        },
        Err(e) => JsonReplay {
            valid: false,
            error: Some(e.to_string()),
            moves: 0,
            result: None,
            events: &[],
        },
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn format_text(decoded: &Result<MatchLog, buffalo_core::ReplayError>) -> String {
    match decoded {
        Ok(log) => {
            let mut out = format!("{} moves\n", log.move_count());
            for (i, event) in log.events().iter().enumerate() {
                out.push_str(&format!("{:>3}. {}\n", i + 1, describe_event(event)));
            }
            if log.outcome().is_none() {
                out.push_str("(in progress)\n");
            }
            out
        }
        Err(e) => format!("invalid: {}\n", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_output() {
        let text = format_text(&decode("nt-1-l"));
        assert!(text.starts_with("1 moves"));
        assert!(text.contains("(4, 4) -> (3, 4)"));
        assert!(text.contains("end: You lose..."));
    }

    #[test]
    fn test_invalid_text_output() {
        assert!(format_text(&decode("garbage")).starts_with("invalid:"));
    }

    #[test]
    fn test_json_output() {
        let json = format_json(&decode("nt-1-i")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["valid"], true);
        assert_eq!(value["moves"], 1);
        assert_eq!(value["events"][0]["type"], "move");
        assert_eq!(value["events"][0]["from"]["row"], 4);
        assert!(value.get("result").is_none());
    }

    #[test]
    fn test_invalid_json_output() {
        let json = format_json(&decode("garbage")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["valid"], false);
        assert!(value["error"].is_string());
    }
}
