use crate::reports;
use clap::Args;
use keymeta::demo::demo_metadata;
use keymeta::keycodes::KeycodeRegistry;
use tracing::error;

#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Print the canonical JSON instead of tables.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

pub fn run(args: &DemoArgs, registry: &KeycodeRegistry) -> bool {
    let meta = match demo_metadata() {
        Ok(meta) => meta,
        Err(e) => {
            error!("{}", e);
            return false;
        }
    };

    if args.json {
        return match meta.to_json() {
            Ok(json) => {
                println!("{}", json);
                true
            }
            Err(e) => {
                error!("{}", e);
                false
            }
        };
    }

    reports::print_metadata(&meta);
    for layer in 0..meta.num_layers {
        reports::print_layer_grid(&meta, 0, layer, registry);
    }
    true
}
