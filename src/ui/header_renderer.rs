// Header row rendering for the reorder demo. Takes everything it draws from
// a HeaderRenderContext so it can be tested without a terminal.

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};

use crate::data::field_grid::FieldGrid;
use crate::reorder::traits::GridViewport;
use crate::ui::terminal_visuals::TerminalVisuals;

pub struct HeaderRenderContext<'a> {
    pub grid: &'a FieldGrid,
    pub visuals: &'a TerminalVisuals,
    pub ghost_char: char,
    pub pin_marker: &'a str,
    pub dragging: bool,
}

/// One styled terminal cell
type StyledCell = (char, Style);

/// Render the bordered header block: field names on the first line, the
/// drag ghost on the second
pub fn render_header(f: &mut Frame, area: Rect, ctx: &HeaderRenderContext) {
    let inner_width = area.width.saturating_sub(2);
    let lines = vec![
        cells_to_line(build_name_row(ctx, inner_width)),
        cells_to_line(build_ghost_row(ctx, inner_width)),
    ];

    let pinned = ctx.grid.fixed_field_count();
    let mut title = format!(
        "Fields ({} total, offset {}/{})",
        ctx.grid.field_count(),
        ctx.grid.scroll_offset(),
        ctx.grid.max_scroll_offset()
    );
    if pinned > 0 {
        title.push_str(&format!(" {} {} pinned", ctx.pin_marker, pinned));
    }
    if ctx.dragging {
        title.push_str(" [dragging]");
    }

    let header = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(header, area);
}

/// Field names laid out along the visible spans, with the insertion line
/// drawn over them
pub fn build_name_row(ctx: &HeaderRenderContext, width: u16) -> Vec<StyledCell> {
    let mut cells = vec![(' ', Style::default()); width as usize];
    let selected = ctx.grid.selected();

    for span in ctx.grid.visible_field_spans() {
        let Some(field) = ctx.grid.fields().get(span.field_index) else {
            continue;
        };
        let left = span.left.round() as usize;
        let right = (span.right().round() as usize).min(cells.len());
        if left >= right {
            continue;
        }

        let mut style = if field.pinned {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };
        if selected.contains(&span.field_index) {
            style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }

        // Last cell of each field is the separator
        let label_cells = right - left - 1;
        for (offset, ch) in field.name.chars().take(label_cells).enumerate() {
            cells[left + offset] = (ch, style);
        }
        cells[right - 1] = ('│', Style::default().fg(Color::DarkGray));
    }

    if let Some(column) = ctx.visuals.placeholder_column(width) {
        cells[column as usize] = (
            '┃',
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        );
    }

    cells
}

pub fn build_ghost_row(ctx: &HeaderRenderContext, width: u16) -> Vec<StyledCell> {
    let mut cells = vec![(' ', Style::default()); width as usize];
    if let Some((start, end)) = ctx.visuals.ghost_columns(width) {
        let style = Style::default().fg(Color::Magenta);
        for cell in &mut cells[start as usize..end as usize] {
            *cell = (ctx.ghost_char, style);
        }
    }
    cells
}

/// Merge runs of equally styled cells into spans
fn cells_to_line(cells: Vec<StyledCell>) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style: Option<Style> = None;

    for (ch, style) in cells {
        if run_style.is_some_and(|s| s != style) {
            spans.push(Span::styled(std::mem::take(&mut run), run_style.unwrap_or_default()));
        }
        run_style = Some(style);
        run.push(ch);
    }
    if let Some(style) = run_style {
        spans.push(Span::styled(run, style));
    }

    Line::from(spans)
}
