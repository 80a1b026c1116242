use std::cell::RefCell;
use std::rc::Rc;

use adw::prelude::*;
use gtk4 as gtk;
use gtk4::prelude::*;
use libadwaita as adw;

use memory_puzzle::scores::{GameStats, ScoreStore};

use super::state::AppState;

fn table_cell(text: &str, class_name: &str, width_chars: i32) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.add_css_class(class_name);
    label.add_css_class("body");
    label.set_halign(gtk::Align::Fill);
    label.set_hexpand(true);
    label.set_xalign(0.5);
    if width_chars > 0 {
        label.set_width_chars(width_chars);
    }
    label
}

fn section_title(text: &str) -> gtk::Label {
    let label = gtk::Label::new(Some(text));
    label.add_css_class("score-section-title");
    label.add_css_class("heading");
    label.set_halign(gtk::Align::Center);
    label.set_xalign(0.5);
    label
}

fn win_rate_text(stats: &GameStats) -> String {
    if stats.games_played == 0 {
        return "---".to_string();
    }
    let pct = u64::from(stats.games_won) * 100 / u64::from(stats.games_played);
    format!("{pct}%")
}

fn build_stats_grid(rows: &[(&str, String)]) -> gtk::Grid {
    let grid = gtk::Grid::new();
    grid.set_halign(gtk::Align::Fill);
    grid.set_hexpand(true);
    grid.set_column_homogeneous(true);
    grid.set_column_spacing(10);
    grid.set_row_spacing(5);

    for (idx, (name, value)) in rows.iter().enumerate() {
        let row = idx as i32;
        grid.attach(&table_cell(name, "score-table-head", 12), 0, row, 1, 1);
        grid.attach(&table_cell(value, "score-table-row", 8), 1, row, 1, 1);
    }

    grid
}

pub fn show_scores_dialog(state: &Rc<RefCell<AppState>>, app: &adw::Application) -> adw::Dialog {
    let (player, best, stats) = {
        let st = state.borrow();
        let player = st.player().to_string();
        (player.clone(), st.store.high_score(&player), st.store.stats())
    };

    let dialog = adw::Dialog::new();
    dialog.set_can_close(true);
    dialog.set_content_width(360);

    let title = gtk::Label::new(Some("Scores"));
    title.add_css_class("dialog-header-title");

    let header = adw::HeaderBar::new();
    header.set_title_widget(Some(&title));
    header.add_css_class("flat");

    let content = gtk::Box::new(gtk::Orientation::Vertical, 8);
    content.add_css_class("score-list-page");
    content.set_margin_top(16);
    content.set_margin_bottom(16);
    content.set_margin_start(16);
    content.set_margin_end(16);

    content.append(&section_title("HIGH SCORE"));
    content.append(&build_stats_grid(&[(player.as_str(), best.to_string())]));
    content.append(&section_title("ALL GAMES"));
    content.append(&build_stats_grid(&[
        ("Played", stats.games_played.to_string()),
        ("Won", stats.games_won.to_string()),
        ("Win rate", win_rate_text(&stats)),
        ("Total score", stats.total_score.to_string()),
    ]));

    let toolbar = adw::ToolbarView::new();
    toolbar.add_top_bar(&header);
    toolbar.set_content(Some(&content));

    dialog.set_child(Some(&toolbar));
    dialog.present(app.active_window().as_ref());
    dialog
}
