//! Rendering of the remote setup script

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;

use mw_core::config::WardenConfig;
use mw_core::error::ConfigError;
use mw_core::screen::shell_quote;

const TEMPLATE: &str = include_str!("setup.sh");

/// Host name that must never end up as the routable IP
const LOCALHOST: &str = "localhost";
const LOOPBACK_IP: &str = "127.0.0.1";

/// `massa-node/config/config.toml` as written by the installer
#[derive(Debug, Serialize)]
struct NodeConfigFile<'a> {
    protocol: ProtocolSection<'a>,
}

#[derive(Debug, Serialize)]
struct ProtocolSection<'a> {
    routable_ip: &'a str,
}

/// The IP to write into the node config; `localhost` becomes `127.0.0.1`
pub fn routable_ip(public_ip: &str) -> &str {
    if public_ip == LOCALHOST {
        LOOPBACK_IP
    } else {
        public_ip
    }
}

/// Render the node's `config.toml`
pub fn render_node_config(routable_ip: &str) -> Result<String, ConfigError> {
    let file = NodeConfigFile {
        protocol: ProtocolSection { routable_ip },
    };
    Ok(toml::to_string(&file)?)
}

/// Render the full setup script for this layout and routable IP
pub fn render_setup_script(
    config: &WardenConfig,
    routable_ip: &str,
) -> Result<String, ConfigError> {
    let install = &config.install;
    let startup = &config.startup;
    let node_config = BASE64.encode(render_node_config(routable_ip)?);

    let substitutions: [(&str, String); 16] = [
        ("@INSTALL_BASE_DIR@", install.base_dir.clone()),
        ("@MASSA_INSTALL_DIR@", install.massa_dir()),
        ("@MASSA_VERSION@", install.massa_version.clone()),
        ("@DOWNLOAD_URL@", install.download_url()),
        ("@NODE_DIR@", install.node_dir()),
        ("@CLIENT_DIR@", install.client_dir()),
        ("@NODE_SCREEN@", install.node_screen.clone()),
        ("@CLIENT_SCREEN@", install.client_screen.clone()),
        ("@NODE_LOG_PATH@", install.node_log_path()),
        ("@NODE_CONFIG_PATH@", install.node_config_path()),
        ("@NODE_CONFIG_B64@", node_config),
        ("@CONFIG_IP@", routable_ip.to_string()),
        ("@NODE_DEADLINE_MS@", startup.node_deadline.as_millis().to_string()),
        ("@CLIENT_DEADLINE_MS@", startup.client_deadline.as_millis().to_string()),
        // bash arithmetic only handles integers; keep at least 1ms
        ("@POLL_INITIAL_MS@", startup.backoff.initial.as_millis().max(1).to_string()),
        ("@POLL_MAX_MS@", startup.backoff.max.as_millis().max(1).to_string()),
    ];

    let mut script = TEMPLATE.to_string();
    for (token, value) in &substitutions {
        script = script.replace(token, &shell_quote(value));
    }
    Ok(script)
}

/// Command writing `content` to `path` through base64, immune to quoting
pub fn upload_command(content: &str, path: &str) -> String {
    format!("echo '{}' | base64 -d > {}", BASE64.encode(content), shell_quote(path))
}

/// Command running the uploaded script with its three positional arguments
pub fn exec_command(
    path: &str,
    node_password: &str,
    public_ip: &str,
    force_reinstall: bool,
) -> String {
    format!(
        "{} {} {} {}",
        shell_quote(path),
        shell_quote(node_password),
        shell_quote(public_ip),
        force_reinstall
    )
}
