use std::collections::HashSet;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use crate::args::ServerArgs;
use crate::config::{Config, ConfigValue};
use crate::server::{Server, DEFAULT_PORT};

mod args;
mod config;
mod generate_headers;
mod handlers;
mod http_parser;
mod http_struct;
mod mime_type_map;
mod path_operations;
mod query_params;
mod server;

fn main() -> ExitCode {
    env_logger::init();
    let args = ServerArgs::parse();
    let server = match Server::init(&args) {
        Ok(server) => server,
        Err(e) => {
            error!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut shell = Shell::new();
    server.run(|config| shell.on_ready(config));
    ExitCode::SUCCESS
}

/// Stand-in for the native window host: validates the config keys the
/// window needs and announces the app URL once the server is listening.
/// A second load for the same app name is a no-op.
struct Shell {
    windows: HashSet<String>,
}

impl Shell {
    fn new() -> Shell {
        Shell {
            windows: HashSet::new(),
        }
    }

    fn on_ready(&mut self, config: &Config) {
        if let Err(message) = self.open_app(config) {
            // Startup validation failure is fatal to the window only;
            // the server keeps serving.
            error!("Server: {}", message);
        }
    }

    fn open_app(&mut self, config: &Config) -> Result<(), String> {
        let project = require_key(config, "project", "No project name set.")?;
        let width = require_key(config, "width", "No width set for window.")?;
        let height = require_key(config, "height", "No height set for window.")?;
        let home = require_key(config, "home", "No home document set.")?;
        let port = config
            .get("port")
            .and_then(ConfigValue::as_int)
            .unwrap_or(DEFAULT_PORT);
        let url = format!("http://localhost:{}/{}", port, home);
        let debug = flag_on(config, "debug");
        let fullscreen = flag_on(config, "fullscreen");
        self.load_app(&project.to_string(), &url, width, height, debug, fullscreen);
        Ok(())
    }

    fn load_app(
        &mut self,
        name: &str,
        url: &str,
        width: &ConfigValue,
        height: &ConfigValue,
        debug: bool,
        fullscreen: bool,
    ) {
        if self.windows.contains(name) {
            return;
        }
        self.windows.insert(name.to_string());
        info!(
            "{} ({}x{}{}{}) ready at {}",
            name,
            width,
            height,
            if fullscreen { ", fullscreen" } else { "" },
            if debug { ", debug" } else { "" },
            url
        );
    }
}

fn require_key<'a>(
    config: &'a Config,
    key: &str,
    message: &str,
) -> Result<&'a ConfigValue, String> {
    config.get(key).ok_or_else(|| message.to_string())
}

fn flag_on(config: &Config, key: &str) -> bool {
    matches!(config.get(key), Some(ConfigValue::Text(value)) if value == "on")
}
