use crate::movies::NewMovie;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormField {
    Title,
    OpeningText,
    ReleaseDate,
}

impl FormField {
    pub(crate) const ALL: [FormField; 3] = [Self::Title, Self::OpeningText, Self::ReleaseDate];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::OpeningText => "Opening Text",
            Self::ReleaseDate => "Release Date",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Title => Self::OpeningText,
            Self::OpeningText => Self::ReleaseDate,
            Self::ReleaseDate => Self::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Title => Self::ReleaseDate,
            Self::OpeningText => Self::Title,
            Self::ReleaseDate => Self::OpeningText,
        }
    }
}

/// Input state of the add-movie modal.
#[derive(Debug, Clone)]
pub(crate) struct AddMovieForm {
    title: String,
    opening_text: String,
    release_date: String,
    focus: FormField,
}

impl Default for AddMovieForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            opening_text: String::new(),
            release_date: String::new(),
            focus: FormField::Title,
        }
    }
}

impl AddMovieForm {
    pub(crate) fn focus(&self) -> FormField {
        self.focus
    }

    pub(crate) fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::OpeningText => &self.opening_text,
            FormField::ReleaseDate => &self.release_date,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::OpeningText => &mut self.opening_text,
            FormField::ReleaseDate => &mut self.release_date,
        }
    }

    pub(crate) fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub(crate) fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    pub(crate) fn push_char(&mut self, ch: char) {
        if !ch.is_control() {
            self.focused_mut().push(ch);
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    pub(crate) fn submit(&self) -> Result<NewMovie, &'static str> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("title is required");
        }
        Ok(NewMovie {
            title: title.to_string(),
            opening_text: self.opening_text.trim().to_string(),
            release_date: self.release_date.trim().to_string(),
        })
    }
}
