// Module exports for CLI subcommands
//
// Each module handles a specific CLI subcommand. main.rs parses the arguments
// and dispatches to these handlers.

pub mod route;
pub mod routers;
