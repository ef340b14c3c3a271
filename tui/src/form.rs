use slidegen_common::{ContentMode, FormFields, ImageStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Title,
    Author,
    Slides,
    Mode,
    Description,
    Style,
}

/// Editable form backing the interactive screen.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    fields: FormFields,
    focus: Focus,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Fields shown for the current content mode, in tab order.
    pub fn visible(&self) -> Vec<Focus> {
        let mut order = vec![Focus::Title, Focus::Author, Focus::Slides, Focus::Mode];
        match self.fields.content_mode {
            ContentMode::Ai => order.push(Focus::Style),
            ContentMode::Manual => order.push(Focus::Description),
        }
        order
    }

    pub fn focus_next(&mut self) {
        self.shift_focus(1);
    }

    pub fn focus_prev(&mut self) {
        let len = self.visible().len();
        self.shift_focus(len - 1);
    }

    fn shift_focus(&mut self, by: usize) {
        let order = self.visible();
        let current = order.iter().position(|f| *f == self.focus()).unwrap_or(0);
        self.focus = order[(current + by) % order.len()];
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(text) = self.text_mut() {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.text_mut() {
            text.pop();
        }
    }

    /// Flip the content mode or cycle the image style, depending on focus.
    pub fn toggle(&mut self) {
        match self.focus() {
            Focus::Mode => self.fields.content_mode = self.fields.content_mode.toggle(),
            Focus::Style => {
                let style = self.fields.image_style.unwrap_or_default();
                self.fields.image_style = Some(style.next());
            }
            _ => {}
        }
    }

    pub fn image_style(&self) -> ImageStyle {
        self.fields.image_style.unwrap_or_default()
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focus() {
            Focus::Title => Some(&mut self.fields.title),
            Focus::Author => Some(&mut self.fields.author),
            Focus::Slides => Some(&mut self.fields.num_slides),
            Focus::Description => Some(&mut self.fields.description),
            Focus::Mode | Focus::Style => None,
        }
    }

    /// Label/value pairs for drawing, in tab order.
    pub fn rows(&self) -> Vec<(Focus, &'static str, String)> {
        self.visible()
            .into_iter()
            .map(|focus| {
                let (label, value) = match focus {
                    Focus::Title => ("Presentation Title", self.fields.title.clone()),
                    Focus::Author => ("Author Name", self.fields.author.clone()),
                    Focus::Slides => ("Number of Slides", self.fields.num_slides.clone()),
                    Focus::Mode => ("Content", self.fields.content_mode.to_string()),
                    Focus::Description => ("Description", self.fields.description.clone()),
                    Focus::Style => ("Image Style", self.image_style().to_string()),
                };
                (focus, label, value)
            })
            .collect()
    }
}
