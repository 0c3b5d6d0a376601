use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crucible_render::{
    Color, ExitMode, HostConfig, NodeId, Props, RenderConfig, Runtime, StdoutSink, TerminalSink,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "crucible-render-demo")]
#[command(about = "Simulated install run: finished steps scroll into history, progress stays live")]
struct Cli {
    /// Number of simulated steps
    #[arg(short, long, default_value_t = 12)]
    steps: usize,

    /// Milliseconds between steps
    #[arg(long, default_value_t = 120)]
    tick_ms: u64,

    /// TOML file with render options (throttle_ms, max_dynamic_lines, ...)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// Override the configured exit mode
    #[arg(long, value_enum)]
    exit_mode: Option<ExitArg>,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExitArg {
    Persist,
    Clear,
    ClearDynamic,
}

impl From<ExitArg> for ExitMode {
    fn from(arg: ExitArg) -> Self {
        match arg {
            ExitArg::Persist => ExitMode::Persist,
            ExitArg::Clear => ExitMode::Clear,
            ExitArg::ClearDynamic => ExitMode::ClearDynamic,
        }
    }
}

fn text(rt: &mut Runtime<StdoutSink>, props: Props, content: &str) -> Result<(NodeId, NodeId)> {
    let el = rt.create_instance("text", props)?;
    let raw = rt.create_text_instance(content);
    rt.append_child(el, raw)?;
    Ok((el, raw))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(format!("crucible_render={level}")))
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            RenderConfig::from_toml_str(&source)?
        }
        None => RenderConfig::default(),
    };
    if let Some(mode) = cli.exit_mode {
        config.exit_mode = mode.into();
    }

    let mut rt = Runtime::new(StdoutSink::new(), config);

    let root = rt.create_instance("box", Props::column())?;
    let history = rt.create_instance("static", Props::new())?;
    rt.append_child(root, history)?;

    let status = rt.create_instance("box", Props::row().gap(1))?;
    let (spinner_el, spinner) = text(&mut rt, Props::new().fg(Color::Cyan), "⠋")?;
    let (label_el, label) = text(&mut rt, Props::new(), "starting")?;
    rt.append_child(status, spinner_el)?;
    rt.append_child(status, label_el)?;
    rt.append_child(root, status)?;

    rt.append_child_to_container(root)?;
    rt.on_commit()?;

    const FRAMES: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];
    let mut columns = rt.sink().columns();

    for step in 1..=cli.steps {
        std::thread::sleep(Duration::from_millis(cli.tick_ms));

        let (done, _) = text(
            &mut rt,
            Props::new().fg(Color::Green),
            &format!("✓ step {step} complete"),
        )?;
        rt.append_child(history, done)?;
        rt.commit_text_update(spinner, FRAMES[step % FRAMES.len()])?;
        rt.commit_text_update(label, &format!("running step {}/{}", step + 1, cli.steps))?;
        rt.on_commit()?;

        let now = rt.sink().columns();
        if now != columns {
            columns = now;
            rt.handle_resize()?;
        }
        rt.poll_timer()?;
    }

    let (summary, _) = text(
        &mut rt,
        Props::new().dim(),
        &format!("{} steps finished", cli.steps),
    )?;
    rt.append_child(history, summary)?;
    rt.remove_child(root, status)?;
    rt.on_commit()?;

    rt.unmount()?;
    info!("demo finished");
    Ok(())
}
