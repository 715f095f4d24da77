use anyhow::{Context, bail};

use crate::driver::LookupOptions;

pub const USAGE: &str = "\
usage:
  aspexis-lookup player <name-or-uuid> [--guild-pages N] [--metric KEY] [--character UUID] [--favorite]
  aspexis-lookup history [remove <term>]
  aspexis-lookup favorites [remove <uuid>]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Player {
        term: String,
        options: LookupOptions,
        favorite: bool,
    },
    History,
    ForgetSearch(String),
    Favorites,
    Unfavorite(String),
}

impl Command {
    pub fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let Some(command) = args.next() else {
            bail!("missing command");
        };
        match command.as_str() {
            "player" => parse_player(args),
            "history" => match (args.next().as_deref(), args.next()) {
                (None, _) => Ok(Self::History),
                (Some("remove"), Some(term)) => Ok(Self::ForgetSearch(term)),
                _ => bail!("expected `history` or `history remove <term>`"),
            },
            "favorites" => match (args.next().as_deref(), args.next()) {
                (None, _) => Ok(Self::Favorites),
                (Some("remove"), Some(uuid)) => Ok(Self::Unfavorite(uuid)),
                _ => bail!("expected `favorites` or `favorites remove <uuid>`"),
            },
            other => bail!("unknown command {other:?}"),
        }
    }
}

fn parse_player(mut args: impl Iterator<Item = String>) -> anyhow::Result<Command> {
    let mut term = None;
    let mut options = LookupOptions::default();
    let mut favorite = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--guild-pages" => {
                let raw = args.next().context("--guild-pages needs a value")?;
                options.guild_pages = raw
                    .parse::<usize>()
                    .ok()
                    .filter(|pages| *pages > 0)
                    .with_context(|| format!("invalid page count {raw:?}"))?;
            }
            "--metric" => options.metric = Some(args.next().context("--metric needs a key")?),
            "--character" => {
                options.character = Some(args.next().context("--character needs a uuid")?)
            }
            "--favorite" => favorite = true,
            flag if flag.starts_with("--") => bail!("unknown flag {flag:?}"),
            _ if term.is_none() => term = Some(arg),
            _ => bail!("unexpected argument {arg:?}"),
        }
    }
    let term = term
        .filter(|term| !term.trim().is_empty())
        .context("a player name or uuid is required")?;
    Ok(Command::Player {
        term,
        options,
        favorite,
    })
}
