use crate::reports;
use clap::Args;
use keymeta::api::Validator;
use keymeta::config::FirmwareLimits;
use keymeta::KeymetaError;
use std::path::PathBuf;
use tracing::error;

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub limits: FirmwareLimits,

    pub file: PathBuf,

    /// Profile whose default keymap to draw.
    #[arg(short, long, default_value_t = 0)]
    pub profile: usize,
}

pub fn run(args: &ShowArgs, validator: &Validator) -> bool {
    let meta = match validator.validate_file(&args.file) {
        Ok(meta) => meta,
        Err(KeymetaError::Invalid(report)) => {
            reports::print_issue_table(&args.file.display().to_string(), &report);
            return false;
        }
        Err(e) => {
            error!("{}", e);
            return false;
        }
    };

    if args.profile >= meta.num_profiles {
        error!(
            "Profile {} does not exist, '{}' has {}",
            args.profile, meta.name, meta.num_profiles
        );
        return false;
    }

    reports::print_metadata(&meta);
    for layer in 0..meta.num_layers {
        reports::print_layer_grid(&meta, args.profile, layer, &validator.registry);
    }
    true
}
