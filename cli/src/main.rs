mod commands;
mod terminal;

use commands::{CommandLine, Commands, devices, reset, status};
use terminal::{logging, print};

fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet);
    let cfg = commands.to_config();

    print::banner(cfg.quiet);

    match commands.command {
        Commands::Status(args) => {
            print::header("reading counters", cfg.quiet);
            status::status(args.addresses, &cfg)
        }
        Commands::Reset(args) => {
            print::header("preparing reset", cfg.quiet);
            reset::reset(args, &cfg)
        }
        Commands::Devices => {
            print::header("detected printers", cfg.quiet);
            devices::devices(&cfg)
        }
    }
}
