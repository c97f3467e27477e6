use unicode_segmentation::UnicodeSegmentation;

/// Which part of the widget receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Checklist,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    NewTask,
    /// `fresh` marks a template created just for this prompt; cancelling
    /// removes it again.
    TemplateText { index: usize, fresh: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLine {
    pub kind: InputKind,
    pub buffer: String,
}

impl InputLine {
    pub fn title(&self) -> &'static str {
        match self.kind {
            InputKind::NewTask => "New task",
            InputKind::TemplateText { fresh: true, .. } => "New routine task",
            InputKind::TemplateText { fresh: false, .. } => "Edit routine task",
        }
    }
}

/// Presentation-only state of the terminal widget. Nothing here is
/// persisted.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub panel: Panel,
    pub task_cursor: usize,
    pub template_cursor: usize,
    input: Option<InputLine>,
    status: Option<String>,
}

impl ViewState {
    pub fn move_task_cursor(&mut self, delta: isize, len: usize) {
        self.task_cursor = step(self.task_cursor, delta, len);
    }

    pub fn move_template_cursor(&mut self, delta: isize, len: usize) {
        self.template_cursor = step(self.template_cursor, delta, len);
    }

    /// Keeps both cursors inside their lists after items disappear.
    pub fn clamp(&mut self, tasks: usize, templates: usize) {
        self.task_cursor = self.task_cursor.min(tasks.saturating_sub(1));
        self.template_cursor = self.template_cursor.min(templates.saturating_sub(1));
    }

    pub fn open_settings(&mut self) {
        self.panel = Panel::Settings;
    }

    pub fn close_settings(&mut self) {
        self.panel = Panel::Checklist;
    }

    pub fn input(&self) -> Option<&InputLine> {
        self.input.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.input.is_some()
    }

    pub fn begin_input(&mut self, kind: InputKind, initial: &str) {
        self.input = Some(InputLine {
            kind,
            buffer: initial.to_owned(),
        });
    }

    pub fn push_char(&mut self, ch: char) {
        if let Some(input) = self.input.as_mut() {
            input.buffer.push(ch);
        }
    }

    /// Removes the last grapheme so combined characters go in one step.
    pub fn pop_char(&mut self) {
        if let Some(input) = self.input.as_mut() {
            if let Some((offset, _)) = input.buffer.grapheme_indices(true).next_back() {
                input.buffer.truncate(offset);
            }
        }
    }

    pub fn take_input(&mut self) -> Option<InputLine> {
        self.input.take()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.status = message.map(Into::into);
    }
}

fn step(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = (len - 1) as isize;
    (cursor as isize + delta).clamp(0, max) as usize
}
