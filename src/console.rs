/*
 *  console.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Line commands standing in for tray and window events
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

//! Console commands
//!
//! With `--console` each stdin line is parsed into a [`ConsoleCommand`] and
//! handled between frames, the way tray clicks and pointer motion would be.

use std::str::FromStr;

use thiserror::Error;

pub const HELP: &str = "\
commands:
  menu                              show the tray menu
  activate <n>                      click tray item n
  invoke <plugin> <function> [arg]  call a menu plugin directly
  enable <plugin> | disable <plugin>
  reload                            re-read the configuration
  plugins                           plugin states
  cursor <x> <y>                    move the pointer
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Menu,
    Activate(usize),
    Invoke {
        plugin: String,
        function: String,
        parameter: String,
    },
    Enable(String),
    Disable(String),
    Reload,
    Plugins,
    Cursor(i32, i32),
    Quit,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),

    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("`{0}` is not a number")]
    BadNumber(String),
}

fn number<T: FromStr>(word: Option<&str>, command: &'static str, argument: &'static str) -> Result<T, ConsoleError> {
    let word = word.ok_or(ConsoleError::MissingArgument { command, argument })?;
    word.parse().map_err(|_| ConsoleError::BadNumber(word.to_string()))
}

fn word(word: Option<&str>, command: &'static str, argument: &'static str) -> Result<String, ConsoleError> {
    word.map(str::to_string)
        .ok_or(ConsoleError::MissingArgument { command, argument })
}

impl FromStr for ConsoleCommand {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let mut args = rest.split_whitespace();

        match head.to_ascii_lowercase().as_str() {
            "" => Err(ConsoleError::Empty),
            "menu" | "m" => Ok(ConsoleCommand::Menu),
            "activate" | "a" => Ok(ConsoleCommand::Activate(number(args.next(), "activate", "an item number")?)),
            "invoke" | "i" => {
                let plugin = word(args.next(), "invoke", "a plugin name")?;
                let function = word(args.next(), "invoke", "a function name")?;
                // the parameter is the remainder of the line, spaces included
                let parameter = rest
                    .trim_start()
                    .splitn(3, char::is_whitespace)
                    .nth(2)
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string();
                Ok(ConsoleCommand::Invoke { plugin, function, parameter })
            }
            "enable" => Ok(ConsoleCommand::Enable(word(args.next(), "enable", "a plugin name")?)),
            "disable" => Ok(ConsoleCommand::Disable(word(args.next(), "disable", "a plugin name")?)),
            "reload" => Ok(ConsoleCommand::Reload),
            "plugins" | "p" => Ok(ConsoleCommand::Plugins),
            "cursor" | "c" => {
                let x = number(args.next(), "cursor", "x and y")?;
                let y = number(args.next(), "cursor", "x and y")?;
                Ok(ConsoleCommand::Cursor(x, y))
            }
            "quit" | "q" | "exit" => Ok(ConsoleCommand::Quit),
            "help" | "?" => Ok(ConsoleCommand::Help),
            other => Err(ConsoleError::Unknown(other.to_string())),
        }
    }
}
