/*
 *  main.rs
 *
 *  DeskPet - a companion on the desktop
 *  (c) 2025-26 DeskPet contributors
 *
 *  Command line entry point
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

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Args, Command, FromArgMatches};
use env_logger::Env;
use log::{error, info};

use deskpet::app::PetApp;
use deskpet::config::{default_config_path, find_config_file, ConfigStore, Overrides};
use deskpet::plugin::PluginManager;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

const EXAMPLE_CONFIG: &str = "config_example.toml";

fn cli() -> Command {
    let command = Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::new("debug")
        .action(ArgAction::SetTrue)
        .long("debug")
        .short('v')
        .alias("verbose")
        .help("Enable debug log level")
        .required(false))
        .arg(Arg::new("config")
        .short('c')
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("configuration file (default: ~/.config/deskpet/config.toml, then ./config.toml)")
        .required(false))
        .arg(Arg::new("frames")
        .short('n')
        .long("frames")
        .value_parser(value_parser!(u64))
        .help("Stop after this many frames")
        .required(false))
        .arg(Arg::new("menu")
        .long("menu")
        .action(ArgAction::SetTrue)
        .help("Print the tray menu and exit"))
        .arg(Arg::new("plugins")
        .long("plugins")
        .action(ArgAction::SetTrue)
        .help("Print the state of every configured plugin and exit"))
        .arg(Arg::new("invoke")
        .long("invoke")
        .num_args(2..=3)
        .value_names(["PLUGIN", "FUNCTION", "PARAMETER"])
        .help("Call a menu plugin behaviour and exit"))
        .arg(Arg::new("console")
        .long("console")
        .action(ArgAction::SetTrue)
        .help("Read commands from stdin while running"))
        .arg(Arg::new("dump-config")
        .long("dump-config")
        .action(ArgAction::SetTrue)
        .help("Print the effective configuration and exit"))
        .after_help("DeskPet:\
            \nA companion on the desktop\
            \n\n\tPlugins add tray entries, per-frame behaviour\
            \n\tand startup hooks; see config_example.toml");

    Overrides::augment_args(command)
}

fn open_store(explicit: Option<&PathBuf>) -> anyhow::Result<ConfigStore> {
    let store = match explicit.cloned().or_else(find_config_file) {
        Some(path) => ConfigStore::open(&path, false)
            .with_context(|| format!("cannot open configuration {}", path.display()))?,
        None => ConfigStore::open_or_seed(default_config_path(), Path::new(EXAMPLE_CONFIG))
            .context("cannot create a configuration")?,
    };
    Ok(store)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let overrides = Overrides::from_arg_matches(&matches)?;
    let debug_enabled = matches.get_flag("debug");

    env_logger::Builder::from_env(Env::default().default_filter_or(if debug_enabled {"debug"} else {"info"}))
        .format_timestamp_secs()
        .init();

    info!("{} v.{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let mut store = open_store(matches.get_one::<PathBuf>("config"))?;
    store
        .set_overrides(overrides)
        .context("invalid command line override")?;

    if matches.get_flag("dump-config") {
        print!("{}", store.effective().to_toml()?);
        return Ok(());
    }

    let mut app = PetApp::new(store, PluginManager::with_defaults());
    app.bootstrap();

    let one_shot = if matches.get_flag("plugins") {
        for report in app.plugin_report() {
            println!("{}", report);
        }
        true
    } else if matches.get_flag("menu") {
        print!("{}", app.tray_menu());
        true
    } else if let Some(values) = matches.get_many::<String>("invoke") {
        let values: Vec<&String> = values.collect();
        let parameter = values.get(2).map(|s| s.as_str()).unwrap_or_default();
        match app.invoke(values[0], values[1], parameter) {
            Ok(output) => println!("{:?}", output),
            Err(e) => error!("{}", e),
        }
        true
    } else {
        false
    };

    if !one_shot {
        info!("Running, frame limit {:?}", matches.get_one::<u64>("frames"));
        app.run(matches.get_one::<u64>("frames").copied(), matches.get_flag("console"))
            .await?;
    }

    app.shutdown()?;
    Ok(())
}
