use std::time::Instant;

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, info, trace};

use crate::debounce::Debouncer;
use crate::domain::{CMDMode, ExplorerConfig, HELP_TEXT, Message};
use crate::explorer::{Explorer, SortDirection};
use crate::format::{cell, summary_line, thousands};
use crate::inputter::{InputResult, Inputter};
use crate::record::{Record, text_of};
use crate::ui::{BORDER_HEIGHT, STATUSLINE_HEIGHT, TABLE_HEADER_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    Ready,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    Table,
    Record,
    Categories,
    Popup,
    CmdInput,
}

/// Row selection plus the first visible row of a scrolling list.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Cursor {
    row: usize,
    offset: usize,
}

impl Cursor {
    fn down(&mut self, step: usize, len: usize, page: usize) {
        self.row = std::cmp::min(self.row + step, len.saturating_sub(1));
        self.follow(page);
    }

    fn up(&mut self, step: usize, page: usize) {
        self.row = self.row.saturating_sub(step);
        self.follow(page);
    }

    fn end(&mut self, len: usize, page: usize) {
        self.row = len.saturating_sub(1);
        self.follow(page);
    }

    fn follow(&mut self, page: usize) {
        let page = page.max(1);
        if self.row < self.offset {
            self.offset = self.row;
        } else if self.row >= self.offset + page {
            self.offset = self.row + 1 - page;
        }
    }
}

/// Everything the ui needs to draw one frame.
#[derive(Debug, Clone, Default)]
pub struct UIData {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub show_index: bool,
    pub selected_row: usize,
    pub offset_row: usize,
    pub selected_column: Option<usize>,
    pub sort_column: Option<(usize, SortDirection)>,
    pub summary: String,
    pub show_popup: bool,
    pub popup_message: String,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
}

pub struct Model<R> {
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    explorer: Explorer<R>,
    table: Cursor,
    column: usize,
    record: Cursor,
    categories: Vec<(String, usize)>,
    category: Cursor,
    page_height: usize,
    input: Inputter,
    last_input: InputResult,
    cmd_mode: Option<CMDMode>,
    query_before_edit: String,
    pending_query: Debouncer<String>,
    clipboard: Option<Clipboard>,
    status_message: String,
    uidata: UIData,
}

impl<R: Record> Model<R> {
    pub fn new(explorer: Explorer<R>, config: &ExplorerConfig) -> Self {
        let mut model = Self {
            status: Status::Ready,
            modus: Modus::Table,
            previous_modus: Modus::Table,
            explorer,
            table: Cursor::default(),
            column: 0,
            record: Cursor::default(),
            categories: Vec::new(),
            category: Cursor::default(),
            page_height: 1,
            input: Inputter::default(),
            last_input: InputResult::default(),
            cmd_mode: None,
            query_before_edit: String::new(),
            pending_query: Debouncer::new(config.debounce),
            clipboard: None,
            status_message: String::new(),
            uidata: UIData::default(),
        };
        let loaded = model.explorer.records().len();
        model.status_message = format!("Loaded {} records", thousands(loaded as f64));
        model.refresh();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn explorer(&self) -> &Explorer<R> {
        &self.explorer
    }

    /// While a command line is open every key goes to the input.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::CmdInput
    }

    pub fn quit(&mut self) {
        self.status = Status::Quitting;
    }

    pub fn update(&mut self, message: Message) {
        trace!("Update: Modus {:?}, Message {:?}", self.modus, message);
        match self.modus {
            Modus::Table => match message {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_table(1, true),
                Message::MoveUp => self.move_table(1, false),
                Message::MovePageDown => self.move_table(self.page_height, true),
                Message::MovePageUp => self.move_table(self.page_height, false),
                Message::MoveBeginning => self.table = Cursor::default(),
                Message::MoveEnd => {
                    let len = self.explorer.displayed_count();
                    self.table.end(len, self.page_height);
                }
                Message::MoveLeft => self.column = self.column.saturating_sub(1),
                Message::MoveRight => {
                    let last = self.explorer.config().fields.len().saturating_sub(1);
                    self.column = std::cmp::min(self.column + 1, last);
                }
                Message::Sort => self.sort_current_column(None),
                Message::SortAscending => self.sort_current_column(Some(SortDirection::Ascending)),
                Message::SortDescending => {
                    self.sort_current_column(Some(SortDirection::Descending))
                }
                Message::Search => self.enter_cmd_mode(CMDMode::Search),
                Message::Filter => self.enter_cmd_mode(CMDMode::CategoryFilter),
                Message::Categories => self.show_categories(),
                Message::ClearFilters => self.clear_filters(),
                Message::Reset => {
                    self.explorer.reset();
                    self.view_changed();
                }
                Message::CopyCell => self.copy_table_cell(),
                Message::CopyRow => self.copy_table_row(),
                Message::Enter => self.show_record(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::Record => match message {
                Message::Quit => self.quit(),
                Message::MoveDown => {
                    let len = self.explorer.config().fields.len();
                    self.record.down(1, len, self.page_height);
                }
                Message::MoveUp => self.record.up(1, self.page_height),
                Message::MoveLeft => self.move_table(1, false),
                Message::MoveRight => self.move_table(1, true),
                Message::CopyCell => self.copy_record_cell(),
                Message::CopyRow => self.copy_table_row(),
                Message::Enter | Message::Exit => self.back_to_table(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::Categories => match message {
                Message::Quit => self.quit(),
                Message::MoveDown => self.category.down(1, self.categories.len(), self.page_height),
                Message::MoveUp => self.category.up(1, self.page_height),
                Message::MovePageDown => {
                    let len = self.categories.len();
                    self.category.down(self.page_height, len, self.page_height);
                }
                Message::MovePageUp => self.category.up(self.page_height, self.page_height),
                Message::MoveBeginning => self.category = Cursor::default(),
                Message::MoveEnd => self.category.end(self.categories.len(), self.page_height),
                Message::Enter => self.apply_selected_category(),
                Message::Exit => self.back_to_table(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::Popup => match message {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter | Message::Help => self.close_popup(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::CmdInput => match message {
                Message::RawKey(key) => self.raw_input(key),
                Message::Tick => self.tick(Instant::now()),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
        }
        self.refresh();
    }

    // -------------------- Control handling functions ---------------------- //

    fn ui_resize(&mut self, width: usize, height: usize) {
        let chrome = TABLE_HEADER_HEIGHT + BORDER_HEIGHT + STATUSLINE_HEIGHT;
        self.page_height = height.saturating_sub(chrome).max(1);
        trace!(
            "UI was resized to w:{width}, h:{height}, page height {}",
            self.page_height
        );
        self.table.follow(self.page_height);
        self.category.follow(self.page_height);
        self.record.follow(self.page_height);
    }

    fn move_table(&mut self, step: usize, down: bool) {
        if down {
            let len = self.explorer.displayed_count();
            self.table.down(step, len, self.page_height);
        } else {
            self.table.up(step, self.page_height);
        }
    }

    fn view_changed(&mut self) {
        self.table = Cursor::default();
        let total = self.explorer.total_count();
        self.status_message = match total {
            0 => "No matches".to_string(),
            1 => "1 match".to_string(),
            n => format!("{} matches", thousands(n as f64)),
        };
    }

    fn sort_current_column(&mut self, direction: Option<SortDirection>) {
        let Some(field) = self.explorer.config().fields.get(self.column) else {
            return;
        };
        if !field.sortable {
            self.status_message = format!("{} is not sortable", field.label);
            return;
        }
        let key = field.name.clone();
        let label = field.label.clone();
        self.explorer.set_sort(&key, direction);
        self.table = Cursor::default();
        let sort = &self.explorer.state().sort;
        self.status_message = format!("Sorted by {label} {}", sort.direction.arrow());
        debug!("Sorted by {:?}", sort);
    }

    fn clear_filters(&mut self) {
        self.explorer.set_query("");
        self.explorer.set_category_filter(None);
        self.view_changed();
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        let current = match mode {
            CMDMode::Search => self.explorer.state().query.clone(),
            CMDMode::CategoryFilter => {
                if self.explorer.config().category_field.is_none() {
                    self.status_message = "This dataset has no category".to_string();
                    return;
                }
                self.explorer.state().category.clone().unwrap_or_default()
            }
        };
        trace!("Entering command mode {mode:?} ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CmdInput;
        self.cmd_mode = Some(mode);
        self.query_before_edit = self.explorer.state().query.clone();
        self.input.clear();
        self.input.set(&current);
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.cmd_mode == Some(CMDMode::Search) && self.last_input.changed {
            self.pending_query
                .schedule(self.last_input.input.clone(), Instant::now());
        }
        if self.last_input.finished {
            self.handle_cmd_input();
        }
    }

    /// Applies a debounced search once typing has paused.
    fn tick(&mut self, now: Instant) {
        if let Some(query) = self.pending_query.poll(now) {
            debug!("Debounced search for \"{query}\"");
            self.explorer.set_query(&query);
            self.view_changed();
        }
    }

    fn handle_cmd_input(&mut self) {
        let canceled = self.last_input.canceled;
        let input = self.last_input.input.clone();
        trace!("Handle cmd input \"{input}\", canceled: {canceled}");

        match self.cmd_mode {
            Some(CMDMode::Search) => {
                if canceled {
                    self.pending_query.cancel();
                    let previous = self.query_before_edit.clone();
                    self.explorer.set_query(&previous);
                } else {
                    let query = self.pending_query.flush().unwrap_or(input);
                    self.explorer.set_query(&query);
                }
                self.view_changed();
            }
            Some(CMDMode::CategoryFilter) if !canceled => {
                let value = input.trim();
                self.explorer
                    .set_category_filter((!value.is_empty()).then_some(value));
                self.view_changed();
            }
            Some(CMDMode::CategoryFilter) => {}
            None => info!("Cmd mode is none!"),
        }

        self.modus = self.previous_modus;
        self.previous_modus = Modus::CmdInput;
        self.cmd_mode = None;
        self.input.clear();
        self.last_input = self.input.get();
    }

    fn show_record(&mut self) {
        if self.explorer.displayed_count() == 0 {
            return;
        }
        self.record = Cursor::default();
        self.previous_modus = self.modus;
        self.modus = Modus::Record;
    }

    fn show_categories(&mut self) {
        let Some(field) = self.explorer.config().category_field.clone() else {
            self.status_message = "This dataset has no category".to_string();
            return;
        };
        self.categories = self.explorer.category_values();
        trace!("{} distinct values for {field}", self.categories.len());
        self.category = Cursor::default();
        if let Some(current) = self.explorer.state().category.as_deref()
            && let Some(pos) = self.categories.iter().position(|(v, _)| v == current)
        {
            self.category.row = pos;
            self.category.follow(self.page_height);
        }
        self.previous_modus = self.modus;
        self.modus = Modus::Categories;
    }

    fn apply_selected_category(&mut self) {
        if let Some((value, _)) = self.categories.get(self.category.row).cloned() {
            self.explorer.set_category_filter(Some(&value));
            self.view_changed();
        }
        self.back_to_table();
    }

    fn back_to_table(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::Table;
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::Popup;
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::Popup;
    }

    fn selected_record(&self) -> Option<&R> {
        self.explorer.displayed_record(self.table.row)
    }

    fn copy_table_cell(&mut self) {
        let Some(field) = self.explorer.config().fields.get(self.column) else {
            return;
        };
        let content = self.selected_record().map(|r| cell(r, field));
        if let Some(content) = content {
            self.copy_to_clipboard(content);
        }
    }

    fn copy_record_cell(&mut self) {
        let Some(field) = self.explorer.config().fields.get(self.record.row) else {
            return;
        };
        let content = self.selected_record().map(|r| cell(r, field));
        if let Some(content) = content {
            self.copy_to_clipboard(content);
        }
    }

    fn copy_table_row(&mut self) {
        let Some(record) = self.selected_record() else {
            return;
        };
        let content = self
            .explorer
            .config()
            .fields
            .iter()
            .map(|f| wrap_csv_field(&text_of(record, &f.name)))
            .collect::<Vec<String>>()
            .join(",");
        self.copy_to_clipboard(content);
    }

    fn copy_to_clipboard(&mut self, content: String) {
        trace!("Copy: {content}");
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    self.status_message = format!("Clipboard unavailable: {e}");
                    return;
                }
            }
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            self.status_message = match clipboard.set_text(content) {
                Ok(_) => "Copied to clipboard".to_string(),
                Err(e) => format!("Copy failed: {e}"),
            };
        }
    }

    // ------------------------- UI data building --------------------------- //

    fn refresh(&mut self) {
        let mut uidata = match self.modus {
            Modus::Record => self.record_uidata(),
            Modus::Categories => self.categories_uidata(),
            Modus::Table | Modus::Popup | Modus::CmdInput => match self.previous_modus {
                Modus::Record if self.modus == Modus::Popup => self.record_uidata(),
                Modus::Categories if self.modus == Modus::Popup => self.categories_uidata(),
                _ => self.table_uidata(),
            },
        };
        uidata.show_popup = self.modus == Modus::Popup;
        if uidata.show_popup {
            uidata.popup_message = HELP_TEXT.to_string();
        }
        uidata.active_cmdinput = self.modus == Modus::CmdInput;
        uidata.cmd_mode = self.cmd_mode;
        uidata.cmdinput = self.last_input.clone();
        uidata.status_message = self.status_message.clone();
        self.uidata = uidata;
    }

    fn title(&self) -> String {
        let config = self.explorer.config();
        let state = self.explorer.state();
        let mut title = config.title.clone();
        if !state.query.is_empty() {
            title.push_str(&format!(" | search \"{}\"", state.query));
        }
        if let (Some(field), Some(value)) = (config.category_field.as_deref(), &state.category) {
            let label = config.field(field).map(|f| f.label.as_str()).unwrap_or(field);
            title.push_str(&format!(" | {label} = {value}"));
        }
        title
    }

    fn table_uidata(&self) -> UIData {
        let explorer = &self.explorer;
        let config = explorer.config();
        let sort = &explorer.state().sort;
        let total = explorer.total_count();
        let displayed = explorer.displayed_count();

        let summary = match summary_line(displayed, total) {
            Some(line) => line,
            None if total == 0 => "No matches".to_string(),
            None => format!("{} results", thousands(total as f64)),
        };

        UIData {
            title: self.title(),
            headers: config.fields.iter().map(|f| f.label.clone()).collect(),
            rows: explorer
                .displayed_records()
                .map(|r| config.fields.iter().map(|f| cell(r, f)).collect())
                .collect(),
            show_index: true,
            selected_row: self.table.row,
            offset_row: self.table.offset,
            selected_column: Some(self.column),
            sort_column: config
                .fields
                .iter()
                .position(|f| f.name == sort.key)
                .map(|idx| (idx, sort.direction)),
            summary,
            ..UIData::default()
        }
    }

    fn record_uidata(&self) -> UIData {
        let config = self.explorer.config();
        let rows = match self.selected_record() {
            Some(record) => config
                .fields
                .iter()
                .map(|f| vec![f.label.clone(), cell(record, f)])
                .collect(),
            None => Vec::new(),
        };
        UIData {
            title: format!("R[{}]", config.title),
            headers: vec!["Field".to_string(), "Value".to_string()],
            rows,
            show_index: false,
            selected_row: self.record.row,
            offset_row: self.record.offset,
            selected_column: Some(1),
            summary: format!(
                "Record {} of {}",
                self.table.row + 1,
                self.explorer.displayed_count()
            ),
            ..UIData::default()
        }
    }

    fn categories_uidata(&self) -> UIData {
        let config = self.explorer.config();
        let label = config
            .category_field
            .as_deref()
            .and_then(|name| config.field(name))
            .map(|f| f.label.clone())
            .unwrap_or_default();
        UIData {
            title: format!("C[{}]", config.title),
            headers: vec![label, "Records".to_string()],
            rows: self
                .categories
                .iter()
                .map(|(value, count)| vec![value.clone(), thousands(*count as f64)])
                .collect(),
            show_index: false,
            selected_row: self.category.row,
            offset_row: self.category.offset,
            selected_column: Some(0),
            summary: format!("{} values", self.categories.len()),
            ..UIData::default()
        }
    }
}

fn wrap_csv_field(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = c.chars().any(|c| matches!(c, ' ' | '\t' | ',' | '"'));
    let mut out = c.to_string();
    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping {
        out = format!("\"{out}\"");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::{Dataset, RecipientRecord};
    use crate::loader::load_records;
    use pretty_assertions::assert_eq;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};
    use std::path::Path;
    use std::time::Duration;

    fn model_with(debounce: Duration) -> Model<RecipientRecord> {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/recipients.json");
        let records = load_records::<RecipientRecord>(&path).unwrap();
        let explorer = Explorer::new(records, RecipientRecord::config());
        let config = ExplorerConfig {
            debounce,
            ..ExplorerConfig::default()
        };
        let mut model = Model::new(explorer, &config);
        model.update(Message::Resize(80, 10));
        model
    }

    fn model() -> Model<RecipientRecord> {
        model_with(Duration::from_secs(3600))
    }

    fn type_keys<R: Record>(model: &mut Model<R>, text: &str) {
        for c in text.chars() {
            model.update(Message::RawKey(KeyEvent::new(
                KeyCode::Char(c),
                KeyModifiers::NONE,
            )));
        }
    }

    fn key<R: Record>(model: &mut Model<R>, code: KeyCode) {
        model.update(Message::RawKey(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn first_column(model: &Model<RecipientRecord>) -> Vec<String> {
        model
            .get_uidata()
            .rows
            .iter()
            .map(|r| r[0].clone())
            .collect()
    }

    #[test]
    fn initial_table_is_sorted_by_amount() {
        let m = model();
        let ui = m.get_uidata();
        assert_eq!(
            first_column(&m),
            vec![
                "Cedar Co",
                "Acme LLC",
                "Baker Farms",
                "Dunn Family Trust",
                "Evans & Sons INC"
            ]
        );
        assert_eq!(ui.rows[0][3], "$900.0K");
        assert_eq!(ui.sort_column, Some((3, SortDirection::Descending)));
        assert_eq!(ui.summary, "5 results");
    }

    #[test]
    fn search_is_applied_on_enter() {
        let mut m = model();
        m.update(Message::Search);
        assert!(m.raw_keyevents());
        type_keys(&mut m, "bak");
        assert_eq!(m.explorer().total_count(), 5);
        key(&mut m, KeyCode::Enter);
        assert!(!m.raw_keyevents());
        assert_eq!(m.explorer().state().query, "bak");
        assert_eq!(first_column(&m), vec!["Baker Farms"]);
        assert!(m.get_uidata().title.contains("search \"bak\""));
    }

    #[test]
    fn search_is_debounced_while_typing() {
        let mut m = model_with(Duration::ZERO);
        m.update(Message::Search);
        type_keys(&mut m, "ames");
        m.update(Message::Tick);
        assert!(m.raw_keyevents());
        assert_eq!(m.explorer().state().query, "ames");
        assert_eq!(first_column(&m), vec!["Baker Farms"]);
    }

    #[test]
    fn canceled_search_restores_previous_query() {
        let mut m = model_with(Duration::ZERO);
        m.update(Message::Search);
        type_keys(&mut m, "acme");
        key(&mut m, KeyCode::Enter);

        m.update(Message::Search);
        key(&mut m, KeyCode::Backspace);
        type_keys(&mut m, "zzz");
        m.update(Message::Tick);
        assert_eq!(m.explorer().total_count(), 0);
        assert_eq!(m.get_uidata().summary, "No matches");
        key(&mut m, KeyCode::Esc);
        assert_eq!(m.explorer().state().query, "acme");
        assert_eq!(first_column(&m), vec!["Acme LLC"]);
    }

    #[test]
    fn category_filter_from_input_and_list() {
        let mut m = model();
        m.update(Message::Filter);
        type_keys(&mut m, "TX");
        key(&mut m, KeyCode::Enter);
        assert_eq!(first_column(&m), vec!["Cedar Co", "Acme LLC"]);
        assert!(m.get_uidata().title.contains("State = TX"));

        m.update(Message::Categories);
        let ui = m.get_uidata();
        assert_eq!(ui.rows[0], vec!["IA".to_string(), "2".to_string()]);
        assert_eq!(ui.rows[1], vec!["TX".to_string(), "2".to_string()]);
        assert_eq!(ui.selected_row, 1);
        m.update(Message::MoveBeginning);
        m.update(Message::Enter);
        assert_eq!(m.explorer().state().category.as_deref(), Some("IA"));
        assert_eq!(first_column(&m), vec!["Baker Farms", "Evans & Sons INC"]);

        m.update(Message::ClearFilters);
        assert_eq!(m.explorer().total_count(), 5);
    }

    #[test]
    fn reset_restores_default_sort_and_filters() {
        let mut m = model();
        m.update(Message::Sort);
        m.update(Message::Filter);
        type_keys(&mut m, "IA");
        key(&mut m, KeyCode::Enter);
        m.update(Message::Reset);
        assert_eq!(m.explorer().state().category, None);
        assert_eq!(m.get_uidata().sort_column, Some((3, SortDirection::Descending)));
        assert_eq!(first_column(&m)[0], "Cedar Co");
    }

    #[test]
    fn sort_toggles_on_current_column() {
        let mut m = model();
        m.update(Message::Sort);
        assert_eq!(m.get_uidata().sort_column, Some((0, SortDirection::Ascending)));
        assert_eq!(first_column(&m)[0], "Acme LLC");
        m.update(Message::Sort);
        assert_eq!(first_column(&m)[0], "Evans & Sons INC");

        m.update(Message::MoveRight);
        m.update(Message::MoveRight);
        m.update(Message::MoveRight);
        m.update(Message::SortAscending);
        assert_eq!(first_column(&m)[0], "Evans & Sons INC");
        assert_eq!(m.get_uidata().rows[0][3], "$0");
    }

    #[test]
    fn navigation_scrolls_with_page_height() {
        let mut m = model();
        m.update(Message::Resize(80, 7));
        m.update(Message::MoveEnd);
        let ui = m.get_uidata();
        assert_eq!(ui.selected_row, 4);
        assert_eq!(ui.offset_row, 3);
        m.update(Message::MoveBeginning);
        m.update(Message::MoveUp);
        assert_eq!(m.get_uidata().selected_row, 0);
        m.update(Message::MovePageDown);
        assert_eq!(m.get_uidata().selected_row, 2);
    }

    #[test]
    fn record_view_steps_through_rows() {
        let mut m = model();
        m.update(Message::Enter);
        let ui = m.get_uidata();
        assert_eq!(ui.rows[0], vec!["Recipient".to_string(), "Cedar Co".to_string()]);
        assert_eq!(ui.summary, "Record 1 of 5");
        m.update(Message::MoveRight);
        assert_eq!(m.get_uidata().rows[0][1], "Acme LLC");
        m.update(Message::Exit);
        assert_eq!(m.get_uidata().selected_row, 1);
        assert_eq!(m.get_uidata().headers[0], "Recipient");
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut m = model();
        m.update(Message::Help);
        assert!(m.get_uidata().show_popup);
        m.update(Message::MoveDown);
        assert_eq!(m.get_uidata().selected_row, 0);
        m.update(Message::Exit);
        assert!(!m.get_uidata().show_popup);
        m.update(Message::Quit);
        assert_eq!(m.status, Status::Quitting);
    }

    #[test]
    fn csv_fields_are_quoted_when_needed() {
        assert_eq!(wrap_csv_field("TX"), "TX");
        assert_eq!(wrap_csv_field("Acme LLC"), "\"Acme LLC\"");
        assert_eq!(wrap_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
