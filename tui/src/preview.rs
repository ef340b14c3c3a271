use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use slidegen_common::PreviewImage;

/// Rows and columns needed to lay `count` previews out `columns` wide.
pub fn grid_shape(count: usize, columns: u16) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let cols = usize::from(columns.max(1)).min(count);
    (count.div_ceil(cols), cols)
}

/// Grid of slide previews. Draws nothing at all for an empty list.
pub struct PreviewGrid<'a> {
    images: &'a [PreviewImage],
    columns: u16,
}

impl<'a> PreviewGrid<'a> {
    pub fn new(images: &'a [PreviewImage]) -> Self {
        Self { images, columns: 3 }
    }

    pub fn columns(mut self, columns: u16) -> Self {
        self.columns = columns;
        self
    }
}

impl Widget for PreviewGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.images.is_empty() || area.is_empty() {
            return;
        }

        let (rows, cols) = grid_shape(self.images.len(), self.columns);
        let row_areas = Layout::vertical(vec![Constraint::Ratio(1, rows as u32); rows]).split(area);

        for (row, row_area) in row_areas.iter().enumerate() {
            let cells =
                Layout::horizontal(vec![Constraint::Ratio(1, cols as u32); cols]).split(*row_area);
            for (col, cell) in cells.iter().enumerate() {
                let index = row * cols + col;
                let Some(image) = self.images.get(index) else {
                    break;
                };
                let block = Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Slide {}", index + 1));
                Paragraph::new(cell_label(image))
                    .block(block)
                    .wrap(Wrap { trim: true })
                    .render(*cell, buf);
            }
        }
    }
}

fn cell_label(image: &PreviewImage) -> String {
    if image.is_data_uri() {
        let media = image
            .as_str()
            .trim_start_matches("data:")
            .split([';', ','])
            .next()
            .unwrap_or_default();
        format!("embedded {media} ({} bytes)", image.as_str().len())
    } else {
        image.to_string()
    }
}
