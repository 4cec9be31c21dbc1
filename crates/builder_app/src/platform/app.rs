use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use builder_core::{FormField, Msg, ResultIndicator, UiMode};
use builder_engine::{EngineHandle, RealtimeChannel};
use builder_logging::{builder_info, builder_warn};

use super::config::ClientConfig;
use super::controller::BuildFormController;
use super::effects::{attach_session_id, SubmitHook};
use super::ui::render::TerminalRenderer;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Values typed into the builder form from the command line.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub name: Option<String>,
    pub tags: Option<String>,
    pub imports: Option<String>,
    pub pip: Option<String>,
    pub apt: Option<String>,
    pub package: Option<PathBuf>,
}

impl FormInput {
    fn into_messages(self) -> Vec<Msg> {
        let fields = [
            (FormField::Name, self.name),
            (FormField::Tags, self.tags),
            (FormField::Imports, self.imports),
            (FormField::Pip, self.pip),
            (FormField::Apt, self.apt),
        ];
        let mut messages: Vec<Msg> = fields
            .into_iter()
            .filter_map(|(field, value)| value.map(|value| Msg::FieldChanged { field, value }))
            .collect();
        if let Some(path) = self.package {
            messages.push(Msg::FileSelected {
                path: path.to_string_lossy().into_owned(),
            });
        }
        messages
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: ClientConfig,
    pub form: FormInput,
    pub show_debug: bool,
    pub interactive: bool,
}

/// Runs the form until a result is shown; returns whether the last build
/// succeeded.
pub fn run_app(options: RunOptions) -> anyhow::Result<bool> {
    let RunOptions {
        config,
        form,
        show_debug,
        interactive,
    } = options;

    let engine = EngineHandle::new(config.build_settings()).context("starting engine runtime")?;
    let channel_settings = config
        .channel_settings()
        .context("deriving realtime channel address")?;
    let channel = RealtimeChannel::new(channel_settings);
    let hook = config
        .attach_session_id
        .then(|| Box::new(attach_session_id) as SubmitHook);

    let mut controller = BuildFormController::new(engine, channel, hook);
    let mut renderer = TerminalRenderer::new(show_debug);

    controller.connect();
    for msg in form.into_messages() {
        controller.dispatch(msg);
    }
    wait_for_channel(&mut controller, Duration::from_millis(config.connect_wait_ms));
    print_lines(renderer.render(&controller.view()));

    loop {
        controller.submit();
        let view = controller.view();
        if view.mode == UiMode::Form {
            if let Err(err) = view.form.validate() {
                eprintln!("Cannot submit the build form: {err}");
            }
            return Ok(false);
        }

        // A failed hand-off to the engine lands directly in `Result`.
        let success = follow_build(&mut controller, &mut renderer, &mut print_lines);
        if !interactive || !prompt_restart()? {
            return Ok(success);
        }
        controller.restart();
        controller.consume_dirty();
        print_lines(renderer.render(&controller.view()));
    }
}

fn wait_for_channel(controller: &mut BuildFormController, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    while !controller.view().connected {
        if Instant::now() >= deadline {
            builder_warn!("Realtime channel not connected after {:?}", timeout);
            return;
        }
        controller.pump();
        thread::sleep(POLL_INTERVAL);
    }
    builder_info!("Realtime channel ready");
}

fn follow_build(
    controller: &mut BuildFormController,
    renderer: &mut TerminalRenderer,
    emit: &mut dyn FnMut(Vec<String>),
) -> bool {
    loop {
        controller.pump();
        if controller.consume_dirty() {
            let view = controller.view();
            emit(renderer.render(&view));
            if view.mode == UiMode::Result {
                return view.result.indicator == Some(ResultIndicator::Success);
            }
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn prompt_restart() -> io::Result<bool> {
    print!("Build again? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
