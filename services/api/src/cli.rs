use crate::demo::{
    run_attendance_stats, run_demo, run_eligibility, AttendanceStatsArgs, DemoArgs,
    EligibilityArgs,
};
use crate::server;
use brigade::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Brigade Console",
    about = "Run the brigade membership console or query roster data from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print a member's advancement badge checklist from a roster snapshot
    Eligibility(EligibilityArgs),
    /// Attendance reports
    Attendance {
        #[command(subcommand)]
        command: AttendanceCommand,
    },
    /// Walk through a sample company: eligibility, attendance and birthdays
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum AttendanceCommand {
    /// Present/absent/excused counts for one parade date
    Stats(AttendanceStatsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Eligibility(args) => run_eligibility(args),
        Command::Attendance {
            command: AttendanceCommand::Stats(args),
        } => run_attendance_stats(args),
        Command::Demo(args) => run_demo(args),
    }
}
