use anyhow::{anyhow, Result};
use ratatui::layout::Rect;

use crate::agent::{AgentClient, AgentReply, ChatResponse};
use crate::report;

pub const GREETING: &str = "Hello, I am TITAN. I can analyze financial reports, \
calculate ratios, and fetch real-time market data. How can I help you today?";

/// Fixed acknowledgment appended instead of echoing report markup into the chat.
pub const REPORT_ACK: &str = "Report generated. It is now showing in the report panel.";

/// Fixed notice for transport failures and malformed responses. Details go to
/// the log file, not the chat.
pub const CONNECTION_ERROR: &str = "Connection error: could not reach the TITAN \
backend. Check that it is running and try again.";

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Chat,
    Input,
    Report,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Conversation state (append-only; reset only by restarting the process)
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars
    pub loading: bool,
    chat_task: Option<tokio::task::JoinHandle<Result<ChatResponse>>>,

    // Report surface: raw payload plus its text projection for the pane.
    // Whole-value replacement; the payload string is kept exactly as received.
    pub report: Option<String>,
    pub report_lines: Vec<String>,
    pub report_scroll: u16,

    // Chat scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // height of the message area, set during render
    pub chat_width: u16,  // width of the message area, for wrap calculations

    // Report pane dimensions, set during render
    pub report_height: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for the thinking ellipsis

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub report_area: Option<Rect>,

    // Backend
    agent: AgentClient,
    thread_id: String,
}

impl App {
    pub fn new(agent: AgentClient, thread_id: String) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,

            messages: vec![ChatMessage {
                role: ChatRole::Assistant,
                content: GREETING.to_string(),
            }],
            input: String::new(),
            cursor: 0,
            loading: false,
            chat_task: None,

            report: None,
            report_lines: Vec::new(),
            report_scroll: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            report_height: 0,

            animation_frame: 0,

            chat_area: None,
            report_area: None,

            agent,
            thread_id,
        }
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// Sends the current input to the agent. A no-op when the input is blank
    /// or a request is already in flight.
    pub fn submit(&mut self) {
        if self.loading || self.chat_task.is_some() {
            return;
        }
        let question = self.input.trim().to_string();
        if question.is_empty() {
            return;
        }

        self.input.clear();
        self.cursor = 0;
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: question.clone(),
        });
        self.loading = true;
        self.scroll_chat_to_bottom();

        let agent = self.agent.clone();
        let thread_id = self.thread_id.clone();
        self.chat_task = Some(tokio::spawn(async move {
            agent.chat(&question, &thread_id).await
        }));
    }

    /// Called from the event loop; settles the in-flight request once its
    /// task has finished.
    pub async fn poll_agent(&mut self) {
        let finished = self
            .chat_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        if let Some(task) = self.chat_task.take() {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(anyhow!("agent task panicked: {e}")),
            };
            self.finish_request(result);
        }
    }

    /// Settlement of one submission: always clears the loading flag and
    /// appends exactly one assistant-role entry. Only the report branch
    /// touches the report payload.
    pub fn finish_request(&mut self, result: Result<ChatResponse>) {
        self.loading = false;

        match result {
            Ok(response) => match response.into_reply() {
                AgentReply::Answer(text) => {
                    self.messages.push(ChatMessage {
                        role: ChatRole::Assistant,
                        content: text,
                    });
                }
                AgentReply::Report(markup) => {
                    self.report_lines = report::to_lines(&markup);
                    self.report = Some(markup);
                    self.report_scroll = 0;
                    self.messages.push(ChatMessage {
                        role: ChatRole::Assistant,
                        content: REPORT_ACK.to_string(),
                    });
                }
                AgentReply::Paused { message, error } => {
                    let mut notice = message
                        .unwrap_or_else(|| "The agent paused for human intervention.".to_string());
                    if let Some(error) = error {
                        notice.push_str("\nReported error: ");
                        notice.push_str(&error);
                    }
                    notice.push_str("\nResume the thread from the backend to continue.");
                    self.messages.push(ChatMessage {
                        role: ChatRole::Assistant,
                        content: notice,
                    });
                }
                AgentReply::Failed(cause) => {
                    tracing::warn!(%cause, "unusable agent response");
                    self.messages.push(ChatMessage {
                        role: ChatRole::Assistant,
                        content: CONNECTION_ERROR.to_string(),
                    });
                }
            },
            Err(e) => {
                tracing::warn!("agent request failed: {e:#}");
                self.messages.push(ChatMessage {
                    role: ChatRole::Assistant,
                    content: CONNECTION_ERROR.to_string(),
                });
            }
        }

        self.scroll_chat_to_bottom();
    }

    /// Tick animation frame (called by the Tick event)
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Wrapped-line count of the chat transcript at the current pane width,
    /// including the thinking indicator while a request is in flight.
    fn chat_line_count(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in &self.messages {
            total_lines += 1; // role label line
            for line in msg.content.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // blank line after message
        }

        if self.loading {
            total_lines += 2; // label + thinking indicator
        }

        total_lines
    }

    /// Scroll the chat so the latest entry (or the thinking indicator) is
    /// visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.chat_line_count();
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    // Chat scrolling
    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_chat_down(&mut self) {
        let max_scroll = self.chat_line_count().saturating_sub(self.chat_height);
        if self.chat_scroll < max_scroll {
            self.chat_scroll = self.chat_scroll.saturating_add(1);
        }
    }

    // Report scrolling
    pub fn scroll_report_up(&mut self) {
        self.report_scroll = self.report_scroll.saturating_sub(1);
    }

    pub fn scroll_report_down(&mut self) {
        let total = self.report_lines.len() as u16;
        if self.report_scroll < total.saturating_sub(self.report_height) {
            self.report_scroll = self.report_scroll.saturating_add(1);
        }
    }

    pub fn scroll_report_half_page_down(&mut self) {
        let half_page = self.report_height / 2;
        let max_scroll = (self.report_lines.len() as u16).saturating_sub(self.report_height);
        self.report_scroll = (self.report_scroll + half_page).min(max_scroll);
    }

    pub fn scroll_report_half_page_up(&mut self) {
        let half_page = self.report_height / 2;
        self.report_scroll = self.report_scroll.saturating_sub(half_page);
    }

    pub fn scroll_report_to_top(&mut self) {
        self.report_scroll = 0;
    }

    pub fn scroll_report_to_bottom(&mut self) {
        self.report_scroll = (self.report_lines.len() as u16).saturating_sub(self.report_height);
    }
}
