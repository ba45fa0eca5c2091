use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crossterm::cursor::SetCursorStyle;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;

mod app;
mod credential;
mod events;
mod extract;
mod gateway;
mod host;
mod problem;
mod prompts;
mod session;
mod text_layout;
mod theme;
mod ui;

use app::{App, ContextBar, Screen};
use credential::AppConfig;
use events::AppEvent;
use gateway::{ChatRequest, GatewayError, GatewayEvent, MentorAdapter};
use host::{PageReadAdapter, PageTarget};
use problem::ProblemModel;
use session::{SessionEvent, TutorSession};
use theme::Theme;

#[derive(Debug, Parser)]
#[command(
    name = "codementor",
    about = "Socratic tutor for coding-practice problem pages"
)]
struct Cli {
    /// Problem page to prefill on the start screen (URL or local markup file)
    #[arg(long)]
    page: Option<String>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Run the page extractor once and print the problem model
    Extract {
        /// Local markup file to extract from
        #[arg(long)]
        page_file: Option<PathBuf>,
        /// Page URL; fetched when no file is given, otherwise it selects the
        /// extraction ruleset for the file
        #[arg(long)]
        url: Option<String>,
        /// Print the full model as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    if let Some(CliCommand::Extract {
        page_file,
        url,
        json,
    }) = cli.command
    {
        return run_extract(page_file, url, json);
    }

    let config = credential::load_config()?;
    let stored_key = credential::load_credential()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        SetCursorStyle::SteadyBar
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    let theme = Theme::load_or_default("theme.toml");
    let result = run_app(
        &mut terminal,
        App::default(),
        &theme,
        config,
        stored_key,
        cli.page,
    );

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        SetCursorStyle::DefaultUserShape,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_extract(page_file: Option<PathBuf>, url: Option<String>, json: bool) -> io::Result<()> {
    let target = match (&page_file, &url) {
        (Some(path), _) => PageTarget::File(path.clone()),
        (None, Some(url)) => PageTarget::Url(url.clone()),
        (None, None) => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "extract requires --page-file or --url",
            ));
        }
    };
    let mut snapshot = host::read_page(&target).map_err(io::Error::other)?;
    if let Some(url) = url {
        snapshot.url = url;
    }
    let model = extract::extract(&snapshot).map_err(io::Error::other)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&model).map_err(io::Error::other)?
        );
    } else {
        println!("Platform:    {}", model.platform.display_name());
        println!("Title:       {}", model.display_title());
        println!("Difficulty:  {}", model.difficulty.as_str());
        println!("Examples:    {}", model.examples.len());
        println!(
            "Constraints: {}",
            if model.constraints.is_some() { "yes" } else { "no" }
        );
        println!("Tags:        {}", model.tags.join(", "));
        println!("Language:    {}", model.language);
        println!(
            "Code:        {}",
            match &model.user_code {
                Some(code) => format!("{} bytes", code.len()),
                None => "none".to_string(),
            }
        );
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
    theme: &Theme,
    config: AppConfig,
    stored_key: Option<String>,
    page_arg: Option<String>,
) -> io::Result<()> {
    let mentor_adapter = MentorAdapter::new(config.model.base_url.clone());
    let verify_adapter = MentorAdapter::new(config.model.base_url.clone());
    let page_adapter = PageReadAdapter::new();
    let mut session = TutorSession::new(config.tutor.attempt_threshold);
    let mut api_key = stored_key;
    let mut pending_key: Option<String> = None;
    let mut current_target: Option<PageTarget> = None;

    if let Some(page) = page_arg {
        app.target_input_mut().set_text(page);
    }
    if api_key.is_some() {
        app.show_start();
    }

    while app.running {
        for event in verify_adapter.drain_events() {
            if let GatewayEvent::Verified(result) = event {
                app.set_verify_in_flight(false);
                match result {
                    Ok(()) => {
                        let Some(key) = pending_key.take() else {
                            continue;
                        };
                        match credential::store_credential(&key) {
                            Ok(()) => {
                                api_key = Some(key);
                                app.set_key_notice("Key saved.");
                                app.show_start();
                            }
                            Err(err) => {
                                app.set_key_error(format!("Failed to save key: {err}"));
                            }
                        }
                    }
                    Err(GatewayError::CredentialInvalid) => {
                        pending_key = None;
                        app.set_key_error(
                            "Key verification failed. Please check your key and try again.",
                        );
                    }
                    Err(err) => {
                        pending_key = None;
                        app.set_key_error(format!("Key verification failed: {err}"));
                    }
                }
            }
        }

        for event in page_adapter.drain_events() {
            if app.reread_in_flight() {
                app.set_reread_in_flight(false);
                match event.result {
                    Ok(snapshot) => {
                        let capture = extract::extract_code_refresh(&snapshot);
                        let language = capture.language.clone();
                        if session.apply_code_refresh(capture) {
                            app.set_context_language(language);
                            app.push_system("Re-read your latest code from the editor.");
                        }
                    }
                    Err(err) => {
                        app.push_system(format!("Could not re-read the page: {err}"));
                    }
                }
            } else {
                app.set_read_in_flight(false);
                match event.result {
                    Ok(snapshot) => match extract::extract(&snapshot) {
                        Ok(model) => start_session(
                            &mut app,
                            &mut session,
                            &mentor_adapter,
                            &config,
                            api_key.as_deref(),
                            model,
                        ),
                        Err(err) => app.set_start_error(format!(
                            "Could not read the page: {err}. Refresh and wait for it to fully load."
                        )),
                    },
                    Err(err) => {
                        app.set_start_error(format!("Could not read the page: {err}"));
                    }
                }
            }
        }

        for event in mentor_adapter.drain_events() {
            if let GatewayEvent::Reply(result) = event {
                app.set_reply_in_flight(false);
                match session.apply_reply(result) {
                    Some(SessionEvent::MentorReply {
                        text,
                        segments,
                        pseudo_unlocked,
                    }) => {
                        match segments {
                            Some(segments) => app.push_mentor_pseudo(
                                segments.before,
                                segments.pseudocode,
                                segments.after,
                            ),
                            None => app.push_mentor(text),
                        }
                        if pseudo_unlocked {
                            app.push_system(format!(
                                "Pseudocode unlocked after {} attempts. Keep going!",
                                session.attempt_threshold()
                            ));
                        }
                        app.set_dots(session.attempt_indicator());
                    }
                    Some(SessionEvent::SessionEnded { notice }) => {
                        app.push_system(notice.clone());
                        api_key = None;
                        if let Err(err) = credential::remove_credential() {
                            app.push_system(format!("Failed to clear the stored key: {err}"));
                        }
                        app.show_key_entry();
                        app.set_key_error(notice);
                    }
                    None => {}
                }
            }
        }

        terminal.draw(|frame| ui::render(frame, &app, theme))?;

        match events::next_event()? {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Quit => app.quit(),
            AppEvent::InputChar(c) => app.input_char(c),
            AppEvent::Backspace => app.backspace(),
            AppEvent::CursorLeft => app.cursor_left(),
            AppEvent::CursorRight => app.cursor_right(),
            AppEvent::ToggleMask => app.toggle_key_mask(),
            AppEvent::Back => match app.screen() {
                Screen::Settings => app.close_settings(),
                Screen::Chat | Screen::Start => {
                    app.open_settings(api_key.as_deref().map(credential::masked_key));
                }
                Screen::KeyEntry => {}
            },
            AppEvent::ScrollUp => {
                if app.screen() == Screen::Chat {
                    app.scroll_chat_up(1);
                }
            }
            AppEvent::ScrollDown => {
                if app.screen() == Screen::Chat {
                    let max = ui::chat_max_scroll(screen_rect(terminal)?, &app, theme);
                    app.scroll_chat_down(1, max);
                }
            }
            AppEvent::PageUp => {
                if app.screen() == Screen::Chat {
                    app.scroll_chat_up(App::chat_page_lines());
                }
            }
            AppEvent::PageDown => {
                if app.screen() == Screen::Chat {
                    let max = ui::chat_max_scroll(screen_rect(terminal)?, &app, theme);
                    app.scroll_chat_down(App::chat_page_lines(), max);
                }
            }
            AppEvent::Submit => submit_current_screen(
                &mut app,
                &mut session,
                &config,
                &mut api_key,
                &mut pending_key,
                &mut current_target,
                &mentor_adapter,
                &verify_adapter,
                &page_adapter,
            ),
        }
    }

    Ok(())
}

fn screen_rect(terminal: &Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<Rect> {
    let size = terminal.size()?;
    Ok(Rect::new(0, 0, size.width, size.height))
}

#[allow(clippy::too_many_arguments)]
fn submit_current_screen(
    app: &mut App,
    session: &mut TutorSession,
    config: &AppConfig,
    api_key: &mut Option<String>,
    pending_key: &mut Option<String>,
    current_target: &mut Option<PageTarget>,
    mentor_adapter: &MentorAdapter,
    verify_adapter: &MentorAdapter,
    page_adapter: &PageReadAdapter,
) {
    match app.screen() {
        Screen::KeyEntry => {
            if app.verify_in_flight() {
                return;
            }
            let Some(key) = app.key_input().trimmed() else {
                app.set_key_error("Please paste your API key first.");
                return;
            };
            app.clear_key_messages();
            app.set_verify_in_flight(true);
            *pending_key = Some(key.clone());
            verify_adapter.send_verify(key, config.model.id.clone());
        }
        Screen::Start => {
            if app.read_in_flight() {
                return;
            }
            let Some(raw) = app.target_input().trimmed() else {
                app.set_start_error("Enter a problem page URL or file path first.");
                return;
            };
            let target = PageTarget::parse(&raw);
            if !target.looks_like_problem_page() {
                app.set_start_error("Open a LeetCode or TakeUForward problem page first.");
                return;
            }
            app.clear_start_error();
            *current_target = Some(target.clone());
            app.set_read_in_flight(true);
            page_adapter.read_page(target);
        }
        Screen::Chat => {
            if app.reply_in_flight() || app.reread_in_flight() || session.is_waiting_for_reply() {
                return;
            }
            let Some(message) = app.take_chat_message() else {
                return;
            };
            if App::is_quit_command(&message) {
                app.quit();
                return;
            }
            if App::is_settings_command(&message) {
                app.open_settings(api_key.as_deref().map(credential::masked_key));
                return;
            }
            if App::is_reread_command(&message) {
                match current_target.clone() {
                    Some(target) => {
                        app.set_reread_in_flight(true);
                        page_adapter.read_page(target);
                    }
                    None => app.push_system("No page on record to re-read."),
                }
                return;
            }
            match session.submit(&message) {
                Ok(call) => {
                    app.push_student(message);
                    app.set_dots(session.attempt_indicator());
                    app.set_reply_in_flight(true);
                    mentor_adapter.send_chat(
                        api_key.clone().unwrap_or_default(),
                        ChatRequest::reply(config.model.id.clone(), call.messages),
                    );
                }
                Err(session::SubmitError::NotActive) => {
                    app.push_system(
                        "The session has ended. Enter a new API key to start another one.",
                    );
                }
                Err(_) => {}
            }
        }
        Screen::Settings => {
            *api_key = None;
            *pending_key = None;
            if let Err(err) = credential::remove_credential() {
                app.push_system(format!("Failed to clear the stored key: {err}"));
            }
            app.show_key_entry();
        }
    }
}

fn start_session(
    app: &mut App,
    session: &mut TutorSession,
    mentor_adapter: &MentorAdapter,
    config: &AppConfig,
    api_key: Option<&str>,
    model: ProblemModel,
) {
    let call = session.begin(model);
    app.clear_transcript();
    if let Some(problem) = session.problem() {
        app.set_context(ContextBar {
            title: problem.display_title().to_string(),
            difficulty: problem.difficulty,
            language: problem.language.clone(),
            dots: session.attempt_indicator(),
        });
    }
    app.show_chat();
    app.set_reply_in_flight(true);
    mentor_adapter.send_chat(
        api_key.unwrap_or_default().to_string(),
        ChatRequest::reply(config.model.id.clone(), call.messages),
    );
}
