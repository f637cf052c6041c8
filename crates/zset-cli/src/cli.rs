use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use zset_types::encoding::decode_value;
use zset_types::{Field, FieldValueScore, Key};

#[derive(Parser)]
#[command(name = "zset", about = "Write-wins keyed score sets over HTTP", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a store server
    Serve(ServeArgs),
    /// Insert members under a key (higher or equal score wins)
    Insert(MutateArgs),
    /// Delete members whose stored score is not above the given one
    Delete(MutateArgs),
    /// Read one record
    Select(KeyFieldArgs),
    /// List every key
    Keys(RemoteArgs),
    /// Count the fields under a key
    Size(KeyArgs),
    /// List the fields under a key, lowest score first
    Members(KeyArgs),
    /// Show whether a field is present and its score
    Score(KeyFieldArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<String>,
    /// Route prefix; "/" mounts at the root
    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct RemoteArgs {
    /// Server address, `host:port`
    #[arg(long, default_value = "127.0.0.1:7070")]
    pub remote: String,
    #[arg(long, default_value = "http")]
    pub protocol: String,
    /// Route prefix the server mounts its store under
    #[arg(long, default_value = "/store")]
    pub prefix: String,
    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,
}

#[derive(Args)]
pub struct KeyArgs {
    #[arg(value_parser = parse_key)]
    pub key: Key,
    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Args)]
pub struct KeyFieldArgs {
    #[arg(value_parser = parse_key)]
    pub key: Key,
    #[arg(value_parser = parse_field)]
    pub field: Field,
    #[command(flatten)]
    pub remote: RemoteArgs,
}

#[derive(Args)]
pub struct MutateArgs {
    #[arg(value_parser = parse_key)]
    pub key: Key,
    /// `FIELD=SCORE` or `FIELD=SCORE:BASE64VALUE`
    #[arg(required = true, value_parser = parse_member)]
    pub members: Vec<FieldValueScore>,
    #[command(flatten)]
    pub remote: RemoteArgs,
}

fn parse_key(text: &str) -> Result<Key, String> {
    Key::new(text).map_err(|e| e.to_string())
}

fn parse_field(text: &str) -> Result<Field, String> {
    Field::new(text).map_err(|e| e.to_string())
}

pub fn parse_member(text: &str) -> Result<FieldValueScore, String> {
    let (field, rest) = text
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=SCORE[:VALUE], got {text:?}"))?;
    let (score, value) = rest.split_once(':').unwrap_or((rest, ""));
    let score: i64 = score
        .parse()
        .map_err(|e| format!("invalid score {score:?}: {e}"))?;
    let value = decode_value(value).map_err(|e| e.to_string())?;
    Ok(FieldValueScore::new(parse_field(field)?, value, score))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_with_value() {
        let member = parse_member("F=5:AQI=").unwrap();
        assert_eq!(member.field.as_str(), "F");
        assert_eq!(member.score, 5);
        assert_eq!(&member.value[..], &[1, 2]);
    }

    #[test]
    fn member_without_value() {
        let member = parse_member("F=-3").unwrap();
        assert_eq!(member.score, -3);
        assert!(member.value.is_empty());
    }

    #[test]
    fn malformed_members() {
        assert!(parse_member("F").is_err());
        assert!(parse_member("=1").is_err());
        assert!(parse_member("F=x").is_err());
        assert!(parse_member("F=1:***").is_err());
    }

    #[test]
    fn parses_client_command() {
        let cli = Cli::try_parse_from([
            "zset", "--format", "json", "insert", "K1", "F=5:AQI=", "G=1", "--remote", "node:1",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Command::Insert(args) => {
                assert_eq!(args.key.as_str(), "K1");
                assert_eq!(args.members.len(), 2);
                assert_eq!(args.remote.remote, "node:1");
                assert_eq!(args.remote.protocol, "http");
            }
            _ => panic!("expected insert"),
        }
    }

    #[test]
    fn insert_needs_members() {
        assert!(Cli::try_parse_from(["zset", "insert", "K1"]).is_err());
    }
}
