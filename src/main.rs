use std::fs;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Arg, Command};

use smbgw_console::api::HttpGatewayApi;
use smbgw_console::bus::EventBus;
use smbgw_console::dashboard;
use smbgw_console::form::{finalize, RawValues};
use smbgw_console::layout::{LayoutConfig, LayoutStore};
use smbgw_console::settings::{defaults_for, SettingsCategory};
use smbgw_console::store::FileStore;
use smbgw_console::theme::{EnvVarSignals, LogTarget, ThemeEngine};

fn main() -> Result<()> {
    smbgw_console::init_logging();
    let matches = Command::new("smbgw-console")
        .about("Headless console core for an SMB gateway")
        .subcommand_required(true)
        .subcommand(
            Command::new("validate")
                .about("Normalize a raw share form and print the submission payload")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .help("JSON file of raw form values"),
                ),
        )
        .subcommand(
            Command::new("theme")
                .about("Inspect or change the persisted theme")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the current preference"))
                .subcommand(Command::new("list").about("List registered themes"))
                .subcommand(
                    Command::new("set")
                        .about("Apply a theme (light, dark or auto)")
                        .arg(Arg::new("id").required(true)),
                )
                .subcommand(Command::new("toggle").about("Flip between light and dark")),
        )
        .subcommand(
            Command::new("layout")
                .about("Inspect the persisted widget layout")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("Print every placed widget"))
                .subcommand(
                    Command::new("remove")
                        .about("Remove one widget's layout")
                        .arg(Arg::new("id").required(true)),
                ),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Fetch the share overview from a running gateway")
                .arg(
                    Arg::new("api-url")
                        .long("api-url")
                        .default_value("http://127.0.0.1:8080")
                        .help("Gateway base URL"),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Settings category helpers")
                .subcommand_required(true)
                .subcommand(
                    Command::new("defaults")
                        .about("Print the default payload for one category")
                        .arg(Arg::new("category").required(true)),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("validate", sub)) => {
            let path: &String = sub.get_one("file").context("missing file argument")?;
            let text = fs::read_to_string(path).with_context(|| format!("read {path}"))?;
            let raw: RawValues =
                serde_json::from_str(&text).with_context(|| format!("parse {path}"))?;
            let request = finalize(&raw)?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Some(("theme", sub)) => {
            let mut engine = open_theme_engine()?;
            match sub.subcommand() {
                Some(("show", _)) => {
                    println!("{}", serde_json::to_string_pretty(engine.preference())?);
                }
                Some(("list", _)) => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&engine.available_themes())?
                    );
                }
                Some(("set", set_sub)) => {
                    let id: &String = set_sub.get_one("id").context("missing theme id")?;
                    engine.apply_theme(id)?;
                    println!("theme set to {id}");
                }
                Some(("toggle", _)) => {
                    engine.toggle_theme()?;
                    println!("theme is now {}", engine.resolved_theme_id());
                }
                _ => unreachable!("subcommand required"),
            }
            engine.dispose();
        }
        Some(("layout", sub)) => {
            let store = FileStore::open_default()?;
            let mut layout = LayoutStore::load(Box::new(store), LayoutConfig::default());
            match sub.subcommand() {
                Some(("list", _)) => {
                    println!("{}", serde_json::to_string_pretty(layout.entries())?);
                }
                Some(("remove", rm_sub)) => {
                    let id: &String = rm_sub.get_one("id").context("missing widget id")?;
                    layout.remove_layout(id)?;
                    println!("removed {id}");
                }
                _ => unreachable!("subcommand required"),
            }
        }
        Some(("dashboard", sub)) => {
            let url: &String = sub.get_one("api-url").context("missing api url")?;
            let api = HttpGatewayApi::new(url.clone());
            let summary = dashboard::refresh(&api)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Some(("settings", sub)) => match sub.subcommand() {
            Some(("defaults", def_sub)) => {
                let name: &String = def_sub.get_one("category").context("missing category")?;
                let category = SettingsCategory::from_str(name)
                    .map_err(|_| anyhow::anyhow!("unknown settings category `{name}`"))?;
                println!("{}", serde_json::to_string_pretty(&defaults_for(category))?);
            }
            _ => unreachable!("subcommand required"),
        },
        _ => unreachable!("subcommand required"),
    }

    Ok(())
}

fn open_theme_engine() -> Result<ThemeEngine> {
    let store = FileStore::open_default()?;
    let mut engine = ThemeEngine::new(
        Box::new(store),
        Box::new(EnvVarSignals::from_env()),
        EventBus::new(),
    );
    engine.register_target(Box::new(LogTarget));
    engine.initialize();
    Ok(engine)
}
