use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState},
};

use crate::domain::{CMDMode, ExplorerConfig};
use crate::model::UIData;

pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const BORDER_HEIGHT: usize = 2;
pub const STATUSLINE_HEIGHT: usize = 2;
const COLUMN_WIDTH_MARGIN: usize = 1;

#[derive(Debug)]
pub struct TableUI {
    max_column_width: usize,
}

impl TableUI {
    pub fn new(cfg: &ExplorerConfig) -> Self {
        Self {
            max_column_width: cfg.max_column_width,
        }
    }

    pub fn draw(&self, uidata: &UIData, frame: &mut Frame) {
        let [table_area, status_area] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(STATUSLINE_HEIGHT as u16),
        ])
        .areas(frame.area());

        self.draw_table(uidata, frame, table_area);
        self.draw_statusline(uidata, frame, status_area);
        if uidata.show_popup {
            self.draw_popup(&uidata.popup_message, frame, table_area);
        }
    }

    fn column_widths(&self, uidata: &UIData) -> Vec<usize> {
        uidata
            .headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let data_width = uidata
                    .rows
                    .iter()
                    .filter_map(|r| r.get(idx))
                    .map(|c| c.chars().count())
                    .max()
                    .unwrap_or(0);
                // Room for the sort arrow.
                let header_width = header.chars().count() + 2;
                std::cmp::min(
                    std::cmp::max(header_width, data_width) + COLUMN_WIDTH_MARGIN,
                    self.max_column_width,
                )
            })
            .collect()
    }

    fn draw_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut widths: Vec<Constraint> = Vec::new();
        let mut header: Vec<Cell> = Vec::new();
        if uidata.show_index {
            let index_width = uidata.rows.len().to_string().len() + COLUMN_WIDTH_MARGIN;
            widths.push(Constraint::Length(index_width as u16));
            header.push(Cell::from("#"));
        }
        widths.extend(
            self.column_widths(uidata)
                .into_iter()
                .map(|w| Constraint::Length(w as u16)),
        );
        header.extend(uidata.headers.iter().enumerate().map(|(idx, name)| {
            match uidata.sort_column {
                Some((col, direction)) if col == idx => {
                    Cell::from(format!("{name} {}", direction.arrow())).underlined()
                }
                _ => Cell::from(name.clone()),
            }
        }));

        let rows = uidata.rows.iter().enumerate().map(|(ridx, row)| {
            let mut cells: Vec<Cell> = Vec::with_capacity(row.len() + 1);
            if uidata.show_index {
                cells.push(Cell::from((ridx + 1).to_string()).dark_gray());
            }
            cells.extend(row.iter().map(|c| Cell::from(c.clone())));
            Row::new(cells)
        });

        let block = Block::bordered()
            .title(Line::from(format!(" {} ", uidata.title).bold()).centered())
            .border_set(border::PLAIN);

        let table = Table::new(rows, widths)
            .header(Row::new(header).bold().yellow())
            .block(block)
            .column_spacing(1)
            .row_highlight_style(Style::new().add_modifier(Modifier::REVERSED))
            .cell_highlight_style(Style::new().blue().add_modifier(Modifier::BOLD));

        // The index column shifts every data column by one.
        let selected_column = uidata
            .selected_column
            .map(|c| if uidata.show_index { c + 1 } else { c });
        let mut state = TableState::default()
            .with_offset(uidata.offset_row)
            .with_selected(if uidata.rows.is_empty() {
                None
            } else {
                Some(uidata.selected_row)
            })
            .with_selected_column(selected_column);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let [summary_area, cmd_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);

        let summary = Line::from(vec![
            Span::from(format!(" {} ", uidata.summary)).bold(),
            Span::from(format!(" {}", uidata.status_message)).dark_gray(),
        ]);
        frame.render_widget(Paragraph::new(summary), summary_area);

        if uidata.active_cmdinput {
            let prompt = match uidata.cmd_mode {
                Some(CMDMode::Search) => "/",
                Some(CMDMode::CategoryFilter) => "filter: ",
                None => ":",
            };
            let line = Line::from(vec![
                Span::from(prompt).yellow(),
                Span::from(uidata.cmdinput.input.clone()),
            ]);
            frame.render_widget(Paragraph::new(line), cmd_area);
            let x = cmd_area.x + (prompt.chars().count() + uidata.cmdinput.cursor_pos) as u16;
            frame.set_cursor_position((x.min(cmd_area.right().saturating_sub(1)), cmd_area.y));
        } else {
            let hints = Line::from(vec![
                " Sort ".into(),
                "<s>".blue().bold(),
                " Search ".into(),
                "</>".blue().bold(),
                " Filter ".into(),
                "<f/c>".blue().bold(),
                " Help ".into(),
                "<?>".blue().bold(),
                " Quit ".into(),
                "<q> ".blue().bold(),
            ]);
            frame.render_widget(Paragraph::new(hints), cmd_area);
        }
    }

    fn draw_popup(&self, message: &str, frame: &mut Frame, area: Rect) {
        let height = message.lines().count() as u16 + 2;
        let width = message
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as u16
            + 4;
        let [popup] = Layout::vertical([Constraint::Length(height)])
            .flex(ratatui::layout::Flex::Center)
            .areas(area);
        let [popup] = Layout::horizontal([Constraint::Length(width)])
            .flex(ratatui::layout::Flex::Center)
            .areas(popup);

        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(message).block(block), popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    fn uidata() -> UIData {
        UIData {
            title: "Recipients".to_string(),
            headers: vec!["Recipient".to_string(), "Amount".to_string()],
            rows: vec![
                vec!["Cedar Co".to_string(), "$900.0K".to_string()],
                vec!["Acme LLC".to_string(), "$500.0K".to_string()],
            ],
            show_index: true,
            summary: "Showing 2 of 3 results".to_string(),
            ..UIData::default()
        }
    }

    #[test]
    fn column_widths_are_capped() {
        let ui = TableUI::new(&ExplorerConfig {
            max_column_width: 10,
            ..ExplorerConfig::default()
        });
        let mut data = uidata();
        data.rows[0][0] = "A very long recipient name".to_string();
        assert_eq!(ui.column_widths(&data), vec![10, 9]);
    }

    #[test]
    fn renders_rows_and_summary() {
        let ui = TableUI::new(&ExplorerConfig::default());
        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        terminal.draw(|f| ui.draw(&uidata(), f)).unwrap();
        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(content.contains("Cedar Co"));
        assert!(content.contains("$500.0K"));
        assert!(content.contains("Showing 2 of 3 results"));
    }
}
