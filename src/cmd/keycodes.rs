use crate::reports;
use clap::Args;
use keymeta::keycodes::KeycodeRegistry;

#[derive(Args, Debug, Clone)]
pub struct KeycodesArgs {
    /// Only list keycodes whose name or alias contains this text.
    #[arg(short, long)]
    pub filter: Option<String>,
}

pub fn run(args: &KeycodesArgs, registry: &KeycodeRegistry) -> bool {
    reports::print_keycode_table(registry, args.filter.as_deref());
    true
}
