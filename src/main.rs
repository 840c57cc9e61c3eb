use anyhow::Result;
use clap::Parser;
use pkgmeta::commands::{self, ListOptions};
use pkgmeta::config::ConfigKey;
use pkgmeta::package::PackageState;
use std::path::PathBuf;

/// pkgmeta - package metadata for a project
///
/// Inspect the packages installed into a project and edit the configuration
/// stored in its pkgmeta.json and in the global config file.
///
/// The global config file lives in $PKGMETA_HOME/config.json when that
/// variable is set, otherwise in the platform config directory.
///
/// Examples:
///   pkgmeta list                      # List the root package and installed packages
///   pkgmeta config get cache          # Print the resolved cache directory
///   pkgmeta config set dir build      # Move every {$dir}-based path under build/
///   pkgmeta plugin add acme/plugin    # Register a plugin for the project
#[derive(Parser, Debug)]
#[command(author, version = env!("PKGMETA_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root directory (defaults to the current directory; also via PKGMETA_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "PKGMETA_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List the packages of the project
    List(ListArgs),

    /// Read and write configuration values
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Manage registered plugins
    #[command(subcommand)]
    Plugin(PluginCommand),

    /// Record a package installed into the project
    Install(InstallArgs),

    /// Forget an installed package
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Leave out the root package
    #[arg(long)]
    pub installed: bool,

    /// Only show packages in this state (not-loaded, not-found, not-loadable, enabled)
    #[arg(long, value_name = "STATE")]
    pub state: Option<PackageState>,
}

#[derive(clap::Subcommand, Debug)]
enum ConfigCommand {
    /// Print every key with its resolved value
    List,

    /// Print the value of a key
    Get {
        #[arg(value_name = "KEY")]
        key: ConfigKey,

        /// Print the stored value without expanding placeholders
        #[arg(long)]
        raw: bool,

        /// Read from the global config instead of the project
        #[arg(long)]
        global: bool,
    },

    /// Set a key ("null" stores an explicit null; lists are comma-separated)
    Set {
        #[arg(value_name = "KEY")]
        key: ConfigKey,

        #[arg(value_name = "VALUE")]
        value: String,

        /// Write to the global config instead of the project
        #[arg(long)]
        global: bool,
    },

    /// Remove a key so it falls back to the next config
    Remove {
        #[arg(value_name = "KEY")]
        key: ConfigKey,

        /// Remove from the global config instead of the project
        #[arg(long)]
        global: bool,
    },
}

#[derive(clap::Subcommand, Debug)]
enum PluginCommand {
    /// List registered plugins
    List,

    /// Register a plugin
    Add {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Unregister a plugin
    Remove {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Install path, relative to the project root or absolute
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Name to record instead of the one the package declares
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    #[arg(value_name = "NAME")]
    pub name: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = pkgmeta::runtime::RealRuntime;

    match cli.command {
        Commands::List(args) => {
            let options = ListOptions {
                installed_only: args.installed,
                state: args.state,
            };
            commands::list(runtime, cli.root, options)?
        }
        Commands::Config(command) => match command {
            ConfigCommand::List => commands::config_list(runtime, cli.root)?,
            ConfigCommand::Get { key, raw, global } => {
                commands::config_get(runtime, cli.root, key, raw, global)?
            }
            ConfigCommand::Set { key, value, global } => {
                commands::config_set(runtime, cli.root, key, &value, global)?
            }
            ConfigCommand::Remove { key, global } => {
                commands::config_remove(runtime, cli.root, key, global)?
            }
        },
        Commands::Plugin(command) => match command {
            PluginCommand::List => commands::plugin_list(runtime, cli.root)?,
            PluginCommand::Add { id } => commands::plugin_add(runtime, cli.root, &id)?,
            PluginCommand::Remove { id } => commands::plugin_remove(runtime, cli.root, &id)?,
        },
        Commands::Install(args) => commands::install(runtime, cli.root, args.path, args.name)?,
        Commands::Remove(args) => commands::remove(runtime, cli.root, &args.name)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_list_parsing() {
        let cli = Cli::try_parse_from(["pkgmeta", "list", "--installed", "--state", "enabled"])
            .unwrap();
        match cli.command {
            Commands::List(args) => {
                assert!(args.installed);
                assert_eq!(args.state, Some(PackageState::Enabled));
            }
            _ => panic!("Expected List command"),
        }
        assert_eq!(cli.root, None);
    }

    #[test]
    fn test_cli_list_rejects_unknown_state() {
        let result = Cli::try_parse_from(["pkgmeta", "list", "--state", "broken"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_config_get_parsing() {
        let cli =
            Cli::try_parse_from(["pkgmeta", "config", "get", "repo-config", "--raw"]).unwrap();
        match cli.command {
            Commands::Config(ConfigCommand::Get { key, raw, global }) => {
                assert_eq!(key, ConfigKey::RepoConfig);
                assert!(raw);
                assert!(!global);
            }
            _ => panic!("Expected config get command"),
        }
    }

    #[test]
    fn test_cli_config_unknown_key_fails() {
        let result = Cli::try_parse_from(["pkgmeta", "config", "get", "colour"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_config_set_global_parsing() {
        let cli = Cli::try_parse_from(["pkgmeta", "config", "set", "dir", "var", "--global"])
            .unwrap();
        match cli.command {
            Commands::Config(ConfigCommand::Set { key, value, global }) => {
                assert_eq!(key, ConfigKey::Dir);
                assert_eq!(value, "var");
                assert!(global);
            }
            _ => panic!("Expected config set command"),
        }
    }

    #[test]
    fn test_cli_plugin_add_parsing() {
        let cli = Cli::try_parse_from(["pkgmeta", "plugin", "add", "acme/plugin"]).unwrap();
        match cli.command {
            Commands::Plugin(PluginCommand::Add { id }) => assert_eq!(id, "acme/plugin"),
            _ => panic!("Expected plugin add command"),
        }
    }

    #[test]
    fn test_cli_install_parsing() {
        let cli = Cli::try_parse_from(["pkgmeta", "install", "vendor/x", "--name", "acme/x"])
            .unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.path, PathBuf::from("vendor/x"));
                assert_eq!(args.name.as_deref(), Some("acme/x"));
            }
            _ => panic!("Expected install command"),
        }
    }

    #[test]
    fn test_cli_global_root_parsing() {
        let cli = Cli::try_parse_from(["pkgmeta", "--root", "/tmp", "plugin", "list"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["pkgmeta"]);
        assert!(result.is_err());
    }
}
