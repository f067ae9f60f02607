//! Application state management for the loan wizard.
//!
//! [`App`] owns the three screen models, the current route and everything the
//! terminal UI needs to render a frame. Remote calls are never made here: they
//! are queued as [`ApiRequest`]s and their outcomes come back as [`ApiEvent`]s.

use crate::domain::{
    AddressWorkData, FieldErrors, FieldKind, FieldSpec, FormData, Gender, LoanParameters,
    PersonalData, Route, Workplace, accept_phone_input, application_title, approval_message,
    format_phone_digits, subscriber_digits, validate, validate_field,
};
use crate::error::StoreError;
use crate::infrastructure::{FormCache, KeyValueStore, MemoryStore};

pub const MODAL_TITLE: &str = "Заявка отправлена";

/// Represents the current mode of the application.
///
/// The mode determines how key presses are interpreted and which popups are
/// drawn on top of the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Moving between fields and buttons
    Normal,
    /// Typing into a text or phone field
    Editing,
    /// Picking a value for a select field
    Choosing,
    /// Confirmation dialog after a successful submission
    Modal,
    /// Help screen is displayed
    Help,
}

/// Focusable element of a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Field by index in the screen's field list
    Field(usize),
    Back,
    Submit,
}

/// A remote call requested by the application.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    FetchWorkplaces,
    CreateApplication {
        title: String,
        personal: PersonalData,
        params: LoanParameters,
    },
}

/// Outcome of an [`ApiRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiEvent {
    WorkplacesLoaded(Vec<Workplace>),
    WorkplacesFailed(String),
    ApplicationCreated {
        personal: PersonalData,
        params: LoanParameters,
    },
    ApplicationFailed(String),
}

/// Main application state.
///
/// # Examples
///
/// ```
/// use loan_wizard::application::App;
/// use loan_wizard::domain::Route;
///
/// let app = App::default();
/// assert_eq!(app.route, Route::Personal);
/// ```
pub struct App {
    /// Screen currently shown
    pub route: Route,
    pub mode: AppMode,
    pub personal: PersonalData,
    pub address_work: AddressWorkData,
    pub loan: LoanParameters,
    /// Inline validation messages for the current screen
    pub errors: FieldErrors,
    /// Set after a rejected submit; edits then re-validate their field
    pub submitted: bool,
    pub focus: Focus,
    /// Edit buffer for the focused field
    pub input: String,
    /// Cursor position within the edit buffer, in characters
    pub cursor_position: usize,
    /// Field value before editing started, restored on cancel
    edit_original: String,
    /// Highlighted option while choosing
    pub choice_index: usize,
    /// Options fetched from the workplace catalog
    pub workplaces: Vec<Workplace>,
    pub modal_message: Option<String>,
    pub status_message: Option<String>,
    pub help_scroll: usize,
    pending_requests: Vec<ApiRequest>,
    store: Box<dyn KeyValueStore>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Box::new(MemoryStore::default()), Route::Personal)
    }
}

impl App {
    /// Creates the application on top of `store` and mounts `route`.
    pub fn new(store: Box<dyn KeyValueStore>, route: Route) -> Self {
        let mut app = Self {
            route,
            mode: AppMode::Normal,
            personal: PersonalData::default(),
            address_work: AddressWorkData::default(),
            loan: LoanParameters::default(),
            errors: FieldErrors::new(),
            submitted: false,
            focus: Focus::Field(0),
            input: String::new(),
            cursor_position: 0,
            edit_original: String::new(),
            choice_index: 0,
            workplaces: Vec::new(),
            modal_message: None,
            status_message: None,
            help_scroll: 0,
            pending_requests: Vec::new(),
            store,
        };
        app.navigate(route);
        app
    }

    /// Switches to `route` and mounts its screen.
    ///
    /// Mounting reloads the screen's persisted state. The address screen also
    /// asks for the workplace catalog every time it is mounted.
    pub fn navigate(&mut self, route: Route) {
        tracing::info!(path = route.path(), "Navigating");
        self.route = route;
        self.mode = AppMode::Normal;
        self.errors.clear();
        self.submitted = false;
        self.focus = Focus::Field(0);
        self.input.clear();
        self.cursor_position = 0;
        self.modal_message = None;

        match route {
            Route::Personal => {
                self.personal = self.load_form().unwrap_or_default();
            }
            Route::AddressWork => {
                self.pending_requests.push(ApiRequest::FetchWorkplaces);
                self.address_work = self.load_form().unwrap_or_default();
            }
            Route::LoanParameters => {
                self.loan = self
                    .load_form::<LoanParameters>()
                    .map(LoanParameters::snapped)
                    .unwrap_or_default();
            }
        }
    }

    fn load_form<T: FormData>(&self) -> Option<T> {
        FormCache::load(&*self.store, T::STORAGE_KEY)
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &dyn KeyValueStore {
        &*self.store
    }

    /// Drains the requests queued since the last call.
    pub fn take_requests(&mut self) -> Vec<ApiRequest> {
        std::mem::take(&mut self.pending_requests)
    }

    pub fn current_fields(&self) -> &'static [FieldSpec] {
        match self.route {
            Route::Personal => PersonalData::fields(),
            Route::AddressWork => AddressWorkData::fields(),
            Route::LoanParameters => LoanParameters::fields(),
        }
    }

    pub fn field_value(&self, name: &str) -> String {
        match self.route {
            Route::Personal => self.personal.value(name),
            Route::AddressWork => self.address_work.value(name),
            Route::LoanParameters => self.loan.value(name),
        }
    }

    /// Human-readable value of a field, or its placeholder when empty.
    pub fn display_value(&self, spec: &FieldSpec) -> String {
        let value = self.field_value(spec.name);
        if value.is_empty() {
            return spec.placeholder.to_string();
        }
        match spec.kind {
            FieldKind::Select => self
                .select_options(spec.name)
                .into_iter()
                .find(|(option, _)| *option == value)
                .map(|(_, label)| label)
                .unwrap_or(value),
            _ => value,
        }
    }

    /// Sets a field on the current screen and persists the screen immediately.
    pub fn set_field_value(&mut self, name: &str, value: String) {
        match self.route {
            Route::Personal => self.personal.set_value(name, value),
            Route::AddressWork => self.address_work.set_value(name, value),
            Route::LoanParameters => self.loan.set_value(name, value),
        }
        self.persist_current();
        self.revalidate(name);
    }

    fn revalidate(&mut self, name: &str) {
        if !self.submitted {
            return;
        }
        let Some(spec) = self.current_fields().iter().find(|spec| spec.name == name) else {
            return;
        };
        match validate_field(&spec.rules, &self.field_value(name)) {
            Some(message) => {
                self.errors.insert(spec.name, message);
            }
            None => {
                self.errors.remove(spec.name);
            }
        }
    }

    /// Writes the current screen's model to the store.
    pub fn persist_current(&mut self) {
        let result = match self.route {
            Route::Personal => save_form(&mut *self.store, &self.personal),
            Route::AddressWork => save_form(&mut *self.store, &self.address_work),
            Route::LoanParameters => save_form(&mut *self.store, &self.loan),
        };
        if let Err(e) = result {
            self.report_store_error(e);
        }
    }

    fn report_store_error(&mut self, error: StoreError) {
        tracing::warn!(error = %error, "Failed to persist form state");
        self.status_message = Some(format!("Не удалось сохранить данные: {}", error));
    }

    pub fn validate_current(&self) -> FieldErrors {
        match self.route {
            Route::Personal => validate(&self.personal),
            Route::AddressWork => validate(&self.address_work),
            Route::LoanParameters => validate(&self.loan),
        }
    }

    /// Handles the screen's primary button.
    ///
    /// The first two screens validate, persist and advance. The last screen
    /// queues the application for submission.
    pub fn submit(&mut self) {
        if self.route == Route::LoanParameters {
            self.submit_application();
            return;
        }

        let errors = self.validate_current();
        if !errors.is_empty() {
            tracing::debug!(path = self.route.path(), invalid = errors.len(), "Submit blocked by validation");
            let first_invalid = self
                .current_fields()
                .iter()
                .position(|spec| errors.contains_key(spec.name));
            self.errors = errors;
            self.submitted = true;
            if let Some(index) = first_invalid {
                self.focus = Focus::Field(index);
            }
            return;
        }

        self.persist_current();
        if let Some(next) = self.route.next() {
            self.navigate(next);
        }
    }

    fn submit_application(&mut self) {
        let personal: PersonalData = self.load_form().unwrap_or_default();
        let params = self.loan;
        tracing::info!(
            amount = params.loan_amount,
            term = params.loan_term,
            "Submitting loan application"
        );
        self.pending_requests.push(ApiRequest::CreateApplication {
            title: application_title(&personal),
            personal,
            params,
        });
        self.status_message = Some("Отправка заявки...".to_string());
    }

    /// Returns to the previous screen without validating.
    pub fn back(&mut self) {
        if let Some(previous) = self.route.previous() {
            self.navigate(previous);
        }
    }

    pub fn handle_api_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::WorkplacesLoaded(workplaces) => {
                tracing::debug!(count = workplaces.len(), "Workplace list received");
                self.workplaces = workplaces;
            }
            ApiEvent::WorkplacesFailed(error) => {
                tracing::error!(error = %error, "Failed to load workplaces");
                self.status_message = Some(format!("Ошибка при загрузке мест работы: {}", error));
            }
            ApiEvent::ApplicationCreated { personal, params } => {
                if let Err(e) = save_form(&mut *self.store, &params) {
                    self.report_store_error(e);
                } else {
                    self.status_message = None;
                }
                let message = approval_message(&personal, &params);
                if self.route == Route::LoanParameters && self.mode == AppMode::Normal {
                    self.loan = params;
                    self.modal_message = Some(message);
                    self.mode = AppMode::Modal;
                } else {
                    // The user has moved on since submitting; don't take over the screen.
                    tracing::info!(path = self.route.path(), "Application accepted after leaving the loan screen");
                    self.status_message = Some(message);
                }
            }
            ApiEvent::ApplicationFailed(error) => {
                tracing::error!(error = %error, "Failed to submit application");
                self.status_message = Some(format!("Ошибка при отправке заявки: {}", error));
            }
        }
    }

    pub fn close_modal(&mut self) {
        self.mode = AppMode::Normal;
        self.modal_message = None;
    }

    pub fn focus_items(&self) -> Vec<Focus> {
        let mut items: Vec<Focus> = (0..self.current_fields().len()).map(Focus::Field).collect();
        if self.route.previous().is_some() {
            items.push(Focus::Back);
        }
        items.push(Focus::Submit);
        items
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_previous(&mut self) {
        self.move_focus(-1);
    }

    fn move_focus(&mut self, delta: isize) {
        let items = self.focus_items();
        let current = items.iter().position(|item| *item == self.focus).unwrap_or(0);
        let next = (current as isize + delta).rem_euclid(items.len() as isize) as usize;
        self.focus = items[next];
    }

    pub fn focused_field(&self) -> Option<&'static FieldSpec> {
        match self.focus {
            Focus::Field(index) => self.current_fields().get(index),
            _ => None,
        }
    }

    /// Activates the focused element: edit a field, open a select or press a button.
    pub fn activate(&mut self) {
        match self.focus {
            Focus::Back => self.back(),
            Focus::Submit => self.submit(),
            Focus::Field(_) => match self.focused_field().map(|spec| spec.kind) {
                Some(FieldKind::Text | FieldKind::Phone) => self.start_editing(),
                Some(FieldKind::Select) => self.start_choosing(),
                Some(FieldKind::Range(_)) | None => {}
            },
        }
    }

    /// Moves the focused slider by `delta` steps.
    pub fn adjust_range(&mut self, delta: i32) {
        let Some(spec) = self.focused_field() else {
            return;
        };
        let FieldKind::Range(range) = spec.kind else {
            return;
        };
        let current = self.field_value(spec.name).parse().unwrap_or(range.min);
        let next = range.step_by(current, delta);
        if next != current {
            self.set_field_value(spec.name, next.to_string());
        }
    }

    /// Switches to editing mode for the focused text or phone field.
    pub fn start_editing(&mut self) {
        let Some(spec) = self.focused_field() else {
            return;
        };
        if !matches!(spec.kind, FieldKind::Text | FieldKind::Phone) {
            return;
        }
        self.mode = AppMode::Editing;
        self.input = self.field_value(spec.name);
        self.edit_original = self.input.clone();
        self.cursor_position = self.input.chars().count();
        self.status_message = None;
    }

    /// Leaves editing mode keeping the typed value and moves to the next element.
    pub fn finish_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.edit_original.clear();
        self.cursor_position = 0;
        self.focus_next();
    }

    /// Leaves editing mode and restores the value the field had before.
    pub fn cancel_editing(&mut self) {
        self.input = std::mem::take(&mut self.edit_original);
        self.apply_input();
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    fn editing_phone(&self) -> bool {
        matches!(self.focused_field().map(|spec| spec.kind), Some(FieldKind::Phone))
    }

    fn apply_input(&mut self) {
        if let Some(spec) = self.focused_field() {
            self.set_field_value(spec.name, self.input.clone());
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if self.editing_phone() {
            if !c.is_ascii_digit() {
                return;
            }
            // Digits are always appended; the cursor stays pinned to the end.
            let mut candidate = self.input.clone();
            candidate.push(c);
            let Some(formatted) = accept_phone_input(&candidate) else {
                return;
            };
            self.input = formatted;
            self.cursor_position = self.input.chars().count();
        } else {
            let offset = byte_offset(&self.input, self.cursor_position);
            self.input.insert(offset, c);
            self.cursor_position += 1;
        }
        self.apply_input();
    }

    pub fn delete_backward(&mut self) {
        if self.editing_phone() {
            let mut digits = subscriber_digits(&self.input);
            if digits.pop().is_none() {
                return;
            }
            self.input = format_phone_digits(&digits);
            self.cursor_position = self.input.chars().count();
        } else {
            if self.cursor_position == 0 {
                return;
            }
            self.cursor_position -= 1;
            let offset = byte_offset(&self.input, self.cursor_position);
            self.input.remove(offset);
        }
        self.apply_input();
    }

    pub fn delete_forward(&mut self) {
        if self.editing_phone() || self.cursor_position >= self.input.chars().count() {
            return;
        }
        let offset = byte_offset(&self.input, self.cursor_position);
        self.input.remove(offset);
        self.apply_input();
    }

    pub fn move_cursor_left(&mut self) {
        if self.editing_phone() {
            return;
        }
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor_position = (self.cursor_position + 1).min(self.input.chars().count());
    }

    pub fn move_cursor_home(&mut self) {
        if self.editing_phone() {
            return;
        }
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.input.chars().count();
    }

    /// `(value, label)` pairs for a select field on the current screen.
    ///
    /// A saved workplace missing from the fetched catalog is kept as the first
    /// option so the stored choice stays visible.
    pub fn select_options(&self, name: &str) -> Vec<(String, String)> {
        match name {
            "gender" => Gender::ALL
                .iter()
                .map(|gender| (gender.as_str().to_string(), gender.label().to_string()))
                .collect(),
            "workplace" => {
                let mut options: Vec<(String, String)> = self
                    .workplaces
                    .iter()
                    .map(|workplace| (workplace.name.clone(), workplace.name.clone()))
                    .collect();
                let saved = &self.address_work.workplace;
                if !saved.is_empty() && !options.iter().any(|(value, _)| value == saved) {
                    options.insert(0, (saved.clone(), saved.clone()));
                }
                options
            }
            _ => Vec::new(),
        }
    }

    /// Opens the option list of the focused select field.
    pub fn start_choosing(&mut self) {
        let Some(spec) = self.focused_field() else {
            return;
        };
        let options = self.select_options(spec.name);
        if options.is_empty() {
            self.status_message = Some("Список вариантов пока пуст".to_string());
            return;
        }
        let current = self.field_value(spec.name);
        self.choice_index = options
            .iter()
            .position(|(value, _)| *value == current)
            .unwrap_or(0);
        self.mode = AppMode::Choosing;
        self.status_message = None;
    }

    pub fn choice_up(&mut self) {
        self.choice_index = self.choice_index.saturating_sub(1);
    }

    pub fn choice_down(&mut self) {
        let count = self
            .focused_field()
            .map(|spec| self.select_options(spec.name).len())
            .unwrap_or(0);
        if self.choice_index + 1 < count {
            self.choice_index += 1;
        }
    }

    /// Stores the highlighted option and returns to normal mode.
    pub fn confirm_choice(&mut self) {
        if let Some(spec) = self.focused_field() {
            let options = self.select_options(spec.name);
            if let Some((value, _)) = options.into_iter().nth(self.choice_index) {
                self.set_field_value(spec.name, value);
            }
        }
        self.mode = AppMode::Normal;
    }

    pub fn cancel_choosing(&mut self) {
        self.mode = AppMode::Normal;
    }
}

fn save_form<T: FormData>(store: &mut dyn KeyValueStore, data: &T) -> Result<(), StoreError> {
    FormCache::save(store, T::STORAGE_KEY, data)
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}
