//! Line commands for driving a page from a terminal.
//!
//! # Commands
//!
//! - `add <item>` - Add a menu item to the cart
//! - `qty <item> <delta>` - Change a cart line's quantity (e.g. `qty Latte -1`)
//! - `cart` / `close` - Toggle or close the cart panel
//! - `nav` / `link` - Toggle the mobile menu, or follow a link (closes it)
//! - `theme` - Toggle light/dark
//! - `show <n>` - Show testimonial `n` (0-based)
//! - `subscribe <email>` - Submit the newsletter form
//! - `search [query]` - Filter the menu
//! - `blur <field> [value]` - Validate a required form field
//! - `quit` - Unload the page

use thiserror::Error;

use crate::menu::Menu;
use crate::page::PageEvent;

/// Why a command line could not be turned into an event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("{command} needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("not a number: {0}")]
    InvalidNumber(String),

    #[error("no menu item named {0}")]
    UnknownItem(String),
}

/// Parse one command line. Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// Returns a [`CommandError`] for unknown commands or bad arguments.
pub fn parse_command(line: &str, menu: &Menu) -> Result<Option<PageEvent>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(command, rest)| (command, rest.trim()));

    let event = match command.to_lowercase().as_str() {
        "add" => {
            let name = required(rest, "add", "an item name")?;
            let entry = find_entry(menu, name)?;
            PageEvent::AddToCart { entry }
        }
        "qty" => {
            let (name, delta) = rest
                .rsplit_once(char::is_whitespace)
                .ok_or(CommandError::MissingArgument {
                    command: "qty",
                    argument: "an item name and a delta",
                })?;
            let delta = delta
                .trim_start_matches('+')
                .parse::<i64>()
                .map_err(|_| CommandError::InvalidNumber(delta.to_string()))?;
            PageEvent::ChangeQuantity {
                name: canonical_name(menu, name.trim()),
                delta,
            }
        }
        "cart" => PageEvent::ToggleCart,
        "close" => PageEvent::CloseCart,
        "nav" => PageEvent::ToggleNav,
        "link" => PageEvent::NavLinkClicked,
        "theme" => PageEvent::ToggleTheme,
        "show" => {
            let raw = required(rest, "show", "a testimonial number")?;
            let index = raw
                .parse::<usize>()
                .map_err(|_| CommandError::InvalidNumber(raw.to_string()))?;
            PageEvent::SelectTestimonial(index)
        }
        "subscribe" => PageEvent::SubmitNewsletter {
            email: rest.to_string(),
        },
        "search" => PageEvent::SearchMenu {
            query: rest.to_string(),
        },
        "blur" => {
            let rest = required(rest, "blur", "a field name")?;
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .unwrap_or((rest, ""));
            PageEvent::FieldBlurred {
                field: field.to_string(),
                value: value.to_string(),
            }
        }
        "quit" | "exit" => PageEvent::Unload,
        _ => return Err(CommandError::Unknown(command.to_string())),
    };
    Ok(Some(event))
}

fn required<'a>(
    rest: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command, argument })
    } else {
        Ok(rest)
    }
}

fn find_entry(menu: &Menu, name: &str) -> Result<usize, CommandError> {
    menu.entries()
        .iter()
        .position(|entry| entry.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| CommandError::UnknownItem(name.to_string()))
}

/// Cart lines are keyed by the menu's spelling of the name.
fn canonical_name(menu: &Menu, name: &str) -> String {
    find_entry(menu, name)
        .ok()
        .and_then(|index| menu.get(index))
        .map_or_else(|| name.to_string(), |entry| entry.name.clone())
}
