use clap::Subcommand;
use hangtube_core::storage::CONFIG_KEYS;
use hangtube_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a single value
    Get { key: String },
    /// Set a value and save
    Set { key: String, value: String },
    /// Print the whole config as TOML
    List,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    match action {
        ConfigAction::Get { key } => match config.get(&key) {
            Some(value) => println!("{value}"),
            None => {
                return Err(format!(
                    "unknown config key: {key} (known keys: {})",
                    CONFIG_KEYS.join(", ")
                )
                .into())
            }
        },
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            println!("{key} = {value}");
        }
        ConfigAction::List => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}
