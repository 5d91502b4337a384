use crate::app::{AppState, SCENE_COUNT};
use crate::persistence::KvStore;
use crate::ui::styles::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const FRAMES_PER_CYCLE: u32 = 12;
/// Polls per animation frame; slows the ~10 Hz poll down to ~3 fps
const POLLS_PER_FRAME: u32 = 3;

/// Render the decorative scene pane. Purely cosmetic: which channel is
/// showing has no bearing on timer state.
pub fn render_scene_pane<S: KvStore>(f: &mut Frame, app: &AppState<S>, theme: &Theme, area: Rect) {
    let frame_index = ((app.animation_frame / POLLS_PER_FRAME) % FRAMES_PER_CYCLE) as usize;
    let (name, lines) = scene(app.scene_index, frame_index);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" Channel {}/{} · {} ", app.scene_index + 1, SCENE_COUNT, name),
            theme.title(),
        ))
        .border_style(theme.border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let paragraph = Paragraph::new(lines)
        .style(theme.text())
        .alignment(Alignment::Center);
    f.render_widget(paragraph, inner);
}

fn scene(index: usize, frame: usize) -> (&'static str, Vec<Line<'static>>) {
    match index % SCENE_COUNT {
        0 => campfire_scene(frame),
        1 => rain_scene(frame),
        2 => starfield_scene(frame),
        3 => coffee_scene(frame),
        _ => unreachable!(),
    }
}

fn campfire_scene(frame: usize) -> (&'static str, Vec<Line<'static>>) {
    let flames = [
        ("   (   ", "  ) )  ", " ( ( ( "),
        ("  ) )  ", " ( ( ( ", "  ) )  "),
        (" ( ( ( ", "  ) )  ", "   (   "),
        ("  ) )  ", "   (   ", " ( ( ( "),
    ];
    let flame = &flames[(frame / 3) % flames.len()];

    let lines = vec![
        Line::raw(""),
        Line::raw(flame.0),
        Line::raw(flame.1),
        Line::raw(flame.2),
        Line::raw("  /▲\\  "),
        Line::raw(" /═══\\ "),
        Line::raw("═══════"),
        Line::raw(""),
    ];
    ("Campfire", lines)
}

fn rain_scene(frame: usize) -> (&'static str, Vec<Line<'static>>) {
    let drops = [
        ("  /  /   / ", " /  /   /  ", "/  /   /   "),
        (" /  /   /  ", "/  /   /   ", "  /  /   / "),
        ("/  /   /   ", "  /  /   / ", " /  /   /  "),
        ("  /  /   / ", " /  /   /  ", "/  /   /   "),
    ];
    let d = &drops[frame % drops.len()];

    let lines = vec![
        Line::raw(""),
        Line::raw("  .-~~~-.  "),
        Line::raw(" (  cloud )"),
        Line::raw("  `-...-'  "),
        Line::raw(d.0),
        Line::raw(d.1),
        Line::raw(d.2),
        Line::raw("~~~~~~~~~~~"),
    ];
    ("Rain", lines)
}

fn starfield_scene(frame: usize) -> (&'static str, Vec<Line<'static>>) {
    let twinkle = [
        ("*", " ", "·"),
        ("·", "*", " "),
        (" ", "·", "*"),
        ("*", " ", "·"),
    ];
    let stars = &twinkle[frame % twinkle.len()];

    let lines = vec![
        Line::raw(""),
        Line::raw(format!("  {}      {}  ", stars.0, stars.2)),
        Line::raw(format!("      {}      ", stars.1)),
        Line::raw("    .-.    "),
        Line::raw("   (   )   "),
        Line::raw("    `-'    "),
        Line::raw(format!("  {}     {}   ", stars.2, stars.0)),
        Line::raw(""),
    ];
    ("Starfield", lines)
}

fn coffee_scene(frame: usize) -> (&'static str, Vec<Line<'static>>) {
    let steam = [") ) )", "( ( (", ") ) )", "( ( ("];
    let s = steam[(frame / 3) % steam.len()];

    let lines = vec![
        Line::raw(""),
        Line::raw(format!("  {}  ", s)),
        Line::raw(format!("  {}  ", s)),
        Line::raw(" _____ "),
        Line::raw("|     |_"),
        Line::raw("|     | |"),
        Line::raw("|_____|-'"),
        Line::raw(" \\___/ "),
    ];
    ("Coffee", lines)
}
