//! SSH MCP Server
//!
//! This binary runs an MCP server that executes commands on a remote host
//! over SSH, using line-delimited JSON-RPC on stdin/stdout.
//!
//! Architecture:
//! - Main thread: Runs the session worker loop (owns the SSH session)
//! - Background thread: Runs tokio runtime with the stdio MCP server

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ssh_mcp::{
    run_session_loop, McpServer, SessionError, SessionManager, SessionWorker, Ssh2Transport,
    SshArgs,
};
use std::sync::mpsc;
use std::thread;
use tokio::io::BufReader;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const REQUEST_QUEUE_CAPACITY: usize = 16;

#[derive(Parser)]
#[command(name = "ssh-mcp", version, about = "SSH command execution MCP server")]
struct Cli {
    #[command(flatten)]
    ssh: SshArgs,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server on stdin/stdout (default)
    Serve,
    /// Connect, run one command, print its output and exit
    Exec(ExecArgs),
}

#[derive(Args)]
struct ExecArgs {
    /// Shell command to run on the remote host
    #[arg(long)]
    command: String,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging to stderr (stdout is used for MCP protocol)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ssh_mcp=info")))
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(&cli.ssh),
        Command::Exec(args) => run_exec(&cli.ssh, args),
    }
}

async fn wait_for_shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigquit = signal(SignalKind::quit())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
            _ = sigquit.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}

/// Resolves on a shutdown signal; never resolves if handlers can't be installed.
async fn shutdown_requested() {
    match wait_for_shutdown_signal().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Shutdown signal handler failed; server will continue running");
            std::future::pending::<()>().await;
        }
    }
}

fn run_server(ssh: &SshArgs) -> anyhow::Result<()> {
    info!("Starting SSH MCP Server");

    let config = ssh.to_config();
    if !config.is_complete() {
        warn!("SSH_HOST or SSH_USER not set; connect_ssh will fail");
    }

    let (tx, rx) = mpsc::sync_channel(REQUEST_QUEUE_CAPACITY);
    let worker = SessionWorker::new(tx, ssh.command_timeout());

    let server_handle = thread::Builder::new()
        .name("mcp-server".to_string())
        .spawn(move || -> anyhow::Result<()> {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to create tokio runtime")?;

            let result = rt.block_on(async move {
                info!("MCP server listening on stdio");
                let server = McpServer::new(worker.clone());
                let stdin = BufReader::new(tokio::io::stdin());
                let stdout = tokio::io::stdout();

                let served = tokio::select! {
                    res = server.serve(stdin, stdout) => res,
                    _ = shutdown_requested() => Ok(()),
                };

                info!("MCP server shutting down");
                // The worker loop releases the session on exit.
                let _ = worker.shutdown().await;
                served.context("stdio transport failed")
            });
            // A pending stdin read would otherwise hold the runtime open.
            rt.shutdown_background();
            result
        })
        .context("failed to spawn server thread")?;

    let manager = SessionManager::new(config, Box::new(Ssh2Transport::new()));
    info!("Starting session worker loop");
    run_session_loop(rx, manager);

    match server_handle.join() {
        Ok(result) => result?,
        Err(e) => error!("Server thread panicked: {:?}", e),
    }

    info!("Server stopped");
    Ok(())
}

fn run_exec(ssh: &SshArgs, args: ExecArgs) -> anyhow::Result<()> {
    let mut manager = SessionManager::new(ssh.to_config(), Box::new(Ssh2Transport::new()));
    let session = manager.connect().context("Connection failed")?;
    info!(session = %session, "Connected");

    let result = manager.run(&args.command);
    manager.close();

    match result {
        Ok(output) => {
            print!("{}", output.stdout);
            eprint!("{}", output.stderr);
            Ok(())
        }
        Err(SessionError::CommandFailed {
            detail,
            stdout,
            stderr,
        }) => {
            print!("{stdout}");
            eprint!("{stderr}");
            Err(anyhow::anyhow!("Command failed: {detail}"))
        }
        Err(e) => Err(anyhow::Error::new(e).context("Command failed")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_args_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ssh-mcp", "exec", "--command", "ls", "--host", "h", "--user", "u",
        ])
        .expect("should parse");
        assert_eq!(cli.ssh.host.as_deref(), Some("h"));
        assert_eq!(cli.ssh.user.as_deref(), Some("u"));
        match cli.command {
            Some(Command::Exec(args)) => assert_eq!(args.command, "ls"),
            _ => panic!("expected exec subcommand"),
        }
    }

    #[test]
    fn test_ssh_args_before_subcommand() {
        let cli =
            Cli::try_parse_from(["ssh-mcp", "--port", "2222", "serve"]).expect("should parse");
        assert_eq!(cli.ssh.port, 2222);
        assert!(matches!(cli.command, Some(Command::Serve)));
    }
}
