use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for the location bar popup.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Stack `heights` downwards from the top-right corner of `area`, each box
/// `width` wide. Boxes that would fall off the bottom are dropped.
pub(crate) fn corner_stack(area: Rect, width: u16, heights: &[u16]) -> Vec<Rect> {
    let width = width.min(area.width);
    let x = area.x + area.width - width;
    let bottom = area.y + area.height;

    let mut y = area.y;
    let mut rects = Vec::with_capacity(heights.len());
    for &height in heights {
        if y + height > bottom {
            break;
        }
        rects.push(Rect {
            x,
            y,
            width,
            height,
        });
        y += height;
    }
    rects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_stack_hugs_the_right_edge() {
        let area = Rect::new(0, 0, 80, 10);
        let rects = corner_stack(area, 30, &[3, 4, 4]);
        assert_eq!(rects, vec![Rect::new(50, 0, 30, 3), Rect::new(50, 3, 30, 4)]);
    }
}
