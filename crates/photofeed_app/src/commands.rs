use photofeed_core::{Msg, ScrollPosition};

pub const HELP: &str = "\
commands:
  <enter> | more | n          load the next page
  site <name>                 show another site (empty name: no site)
  #?site=<name> | hash <h>    navigate to a location hash
  scroll <offset> <viewport> <document>
                              report a scroll position
  help                        show this help
  q | quit                    exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Feed(Msg),
    Help,
    Quit,
    Unknown(String),
}

/// Parses one line typed by the user.
pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.starts_with('#') {
        return Command::Feed(Msg::UrlChanged(line.to_string()));
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    match word {
        "" | "n" | "more" => Command::Feed(Msg::NextPageRequested),
        "q" | "quit" | "exit" => Command::Quit,
        "help" | "?" => Command::Help,
        "site" => Command::Feed(Msg::SiteSelected(rest.to_string())),
        "hash" | "open" => Command::Feed(Msg::UrlChanged(rest.to_string())),
        "scroll" => parse_scroll(rest)
            .map(|position| Command::Feed(Msg::Scrolled(position)))
            .unwrap_or_else(|| Command::Unknown(line.to_string())),
        _ => Command::Unknown(line.to_string()),
    }
}

fn parse_scroll(args: &str) -> Option<ScrollPosition> {
    let values: Vec<f64> = args
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<Result<_, _>>()
        .ok()?;
    match values.as_slice() {
        [offset, viewport, document] => Some(ScrollPosition::new(*offset, *viewport, *document)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_requests_next_page() {
        assert_eq!(parse(""), Command::Feed(Msg::NextPageRequested));
        assert_eq!(parse("  more "), Command::Feed(Msg::NextPageRequested));
    }

    #[test]
    fn site_and_hash_commands() {
        assert_eq!(
            parse("site a.b"),
            Command::Feed(Msg::SiteSelected("a.b".to_string()))
        );
        assert_eq!(parse("site"), Command::Feed(Msg::SiteSelected(String::new())));
        assert_eq!(
            parse("#?site=a.b"),
            Command::Feed(Msg::UrlChanged("#?site=a.b".to_string()))
        );
        assert_eq!(
            parse("open https://x.example/#?site=c.d"),
            Command::Feed(Msg::UrlChanged("https://x.example/#?site=c.d".to_string()))
        );
    }

    #[test]
    fn scroll_needs_three_numbers() {
        assert_eq!(
            parse("scroll 10 20 30"),
            Command::Feed(Msg::Scrolled(ScrollPosition::new(10.0, 20.0, 30.0)))
        );
        assert_eq!(
            parse("scroll 10 x 30"),
            Command::Unknown("scroll 10 x 30".to_string())
        );
        assert_eq!(parse("scroll 1 2"), Command::Unknown("scroll 1 2".to_string()));
    }

    #[test]
    fn quit_and_unknown() {
        assert_eq!(parse("q"), Command::Quit);
        assert_eq!(parse("dance"), Command::Unknown("dance".to_string()));
    }
}
