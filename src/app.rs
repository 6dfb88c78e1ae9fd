//! Application state and key handling: view toggle, map focus state machine,
//! the city selection sheet, per-province batch updates, and the guarded
//! reset flow. Rendering lives in `ui`; this module only mutates state.

use crossterm::event::KeyCode;

use crate::catalog::{Catalog, City, GRID_COLS};
use crate::level::TravelLevel;
use crate::share;
use crate::stats;
use crate::store::ProgressStore;

/// Event loop poll interval; one tick per timeout.
pub const TICK_MS: u64 = 100;

/// Confirmation flash before the selection sheet closes itself (400 ms).
const SHEET_CLOSE_TICKS: u8 = 4;

/// Reset confirmation countdown (3 s at 100 ms ticks).
const RESET_COUNTDOWN_TICKS: u32 = 30;

pub const ZOOM_MIN: f64 = 0.8;
pub const ZOOM_MAX: f64 = 8.0;
/// Zoom applied when a province takes focus.
pub const FOCUS_ZOOM: f64 = 3.5;
/// Zooming out past this while focused acts as an explicit back.
const BACK_ZOOM_THRESHOLD: f64 = 1.5;

const CITY_GRID_COLS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Map,
    List,
}

/// Discrete map state. Pan and zoom are continuous transforms layered on
/// top; the only coupling is the zoom-out back transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapFocus {
    Overview,
    Province(usize),
}

#[derive(Debug)]
pub struct MapState {
    pub focus: MapFocus,
    pub zoom: f64,
    pub pan: (f64, f64),
    /// Province cursor while in overview.
    pub cursor: usize,
    /// City cursor while a province is focused.
    pub city_cursor: usize,
}

impl MapState {
    fn new() -> Self {
        Self {
            focus: MapFocus::Overview,
            zoom: 1.0,
            pan: (0.0, 0.0),
            cursor: 0,
            city_cursor: 0,
        }
    }
}

/// The modal city-level editor. `close_in` is set once a level was chosen;
/// the sheet then closes by itself after the confirmation flash.
#[derive(Debug)]
pub struct SelectionSheet {
    pub city_id: String,
    pub city_name: String,
    pub chosen: Option<TravelLevel>,
    close_in: Option<u8>,
}

#[derive(Debug)]
pub struct ResetConfirm {
    pub ticks_left: u32,
}

impl ResetConfirm {
    /// The destructive action stays disabled until the countdown ends.
    pub fn armed(&self) -> bool {
        self.ticks_left == 0
    }

    pub fn seconds_left(&self) -> u32 {
        self.ticks_left.div_ceil(10)
    }
}

/// What a flattened list-view row points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRow {
    Province(usize),
    City(usize, usize),
}

pub struct App {
    pub catalog: Catalog,
    pub store: ProgressStore,
    pub view: View,
    pub map: MapState,
    pub list_cursor: usize,
    pub expanded: Option<usize>,
    pub sheet: Option<SelectionSheet>,
    pub reset: Option<ResetConfirm>,
    pub sharing: bool,
    pub show_help: bool,
}

impl App {
    pub fn new(catalog: Catalog, store: ProgressStore) -> Self {
        Self {
            catalog,
            store,
            view: View::Map,
            map: MapState::new(),
            list_cursor: 0,
            expanded: None,
            sheet: None,
            reset: None,
            sharing: false,
            show_help: false,
        }
    }

    /// Handles one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        use KeyCode::*;

        // Modals swallow input first.
        if self.reset.is_some() {
            match key {
                Esc | Char('q') => self.cancel_reset(),
                Enter => {
                    self.confirm_reset();
                }
                _ => {}
            }
            return false;
        }
        if self.sheet.is_some() {
            match key {
                Esc => self.dismiss_sheet(),
                Char(c @ '0'..='3') => {
                    if let Some(level) = TravelLevel::from_ordinal(c as u8 - b'0') {
                        self.sheet_choose(level);
                    }
                }
                _ => {}
            }
            return false;
        }

        match key {
            Char('q') => return true,
            Char('h') | F(1) => self.show_help = !self.show_help,
            Tab => {
                self.view = match self.view {
                    View::Map => View::List,
                    View::List => View::Map,
                };
            }
            Char('x') => self.share(),
            Char('r') => self.begin_reset(),
            _ => match self.view {
                View::Map => self.handle_map_key(key),
                View::List => self.handle_list_key(key),
            },
        }
        false
    }

    fn handle_map_key(&mut self, key: KeyCode) {
        use KeyCode::*;
        match key {
            Char('+') | Char('=') => self.zoom_by(1.25),
            Char('-') => self.zoom_by(0.8),
            Char('w') => self.pan_by(0.0, -1.0),
            Char('s') => self.pan_by(0.0, 1.0),
            Char('a') => self.pan_by(-1.0, 0.0),
            Char('d') => self.pan_by(1.0, 0.0),
            _ => match self.map.focus {
                MapFocus::Overview => match key {
                    Left => self.move_province_cursor(-1),
                    Right => self.move_province_cursor(1),
                    Up => self.move_province_cursor(-(GRID_COLS as isize)),
                    Down => self.move_province_cursor(GRID_COLS as isize),
                    Enter => self.focus_province(self.map.cursor),
                    _ => {}
                },
                MapFocus::Province(index) => match key {
                    Left => self.move_city_cursor(index, -1),
                    Right => self.move_city_cursor(index, 1),
                    Up => self.move_city_cursor(index, -(CITY_GRID_COLS as isize)),
                    Down => self.move_city_cursor(index, CITY_GRID_COLS as isize),
                    Enter => {
                        if let Some(city) = self
                            .catalog
                            .province(index)
                            .and_then(|p| p.cities.get(self.map.city_cursor))
                        {
                            let (id, name) = (city.id.clone(), city.name.clone());
                            self.open_sheet(id, name);
                        }
                    }
                    Esc | Backspace => self.back_to_overview(),
                    _ => {}
                },
            },
        }
    }

    fn handle_list_key(&mut self, key: KeyCode) {
        use KeyCode::*;
        match key {
            Up | Char('k') => {
                self.list_cursor = self.list_cursor.saturating_sub(1);
            }
            Down | Char('j') => {
                if self.list_cursor + 1 < self.list_rows() {
                    self.list_cursor += 1;
                }
            }
            Enter => match self.list_row(self.list_cursor) {
                ListRow::Province(index) => self.toggle_expand(index),
                ListRow::City(pi, ci) => {
                    if let Some(city) = self.catalog.province(pi).and_then(|p| p.cities.get(ci)) {
                        let (id, name) = (city.id.clone(), city.name.clone());
                        self.open_sheet(id, name);
                    }
                }
            },
            Char(c @ '0'..='3') => {
                if let Some(level) = TravelLevel::from_ordinal(c as u8 - b'0') {
                    match self.list_row(self.list_cursor) {
                        ListRow::Province(index) => self.batch_set_province(index, level),
                        ListRow::City(pi, ci) => {
                            if let Some(city) =
                                self.catalog.province(pi).and_then(|p| p.cities.get(ci))
                            {
                                let id = city.id.clone();
                                self.store.set(&id, level);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    // --- map focus state machine ---

    /// Overview -> focus. Ignored while another province is focused: the
    /// reference behavior requires an explicit back first.
    pub fn focus_province(&mut self, index: usize) {
        if self.map.focus != MapFocus::Overview || index >= self.catalog.provinces().len() {
            return;
        }
        self.map.focus = MapFocus::Province(index);
        self.map.zoom = FOCUS_ZOOM;
        self.map.pan = (0.0, 0.0);
        self.map.city_cursor = 0;
    }

    pub fn back_to_overview(&mut self) {
        if let MapFocus::Province(index) = self.map.focus {
            self.map.focus = MapFocus::Overview;
            self.map.cursor = index;
        }
        self.map.zoom = 1.0;
        self.map.pan = (0.0, 0.0);
    }

    /// Continuous zoom; falling below the threshold while focused is the
    /// derived back transition.
    pub fn zoom_by(&mut self, factor: f64) {
        self.map.zoom = (self.map.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        if matches!(self.map.focus, MapFocus::Province(_)) && self.map.zoom < BACK_ZOOM_THRESHOLD {
            self.back_to_overview();
        }
    }

    fn pan_by(&mut self, dx: f64, dy: f64) {
        let step = 20.0 / self.map.zoom;
        self.map.pan.0 += dx * step;
        self.map.pan.1 += dy * step;
    }

    fn move_province_cursor(&mut self, delta: isize) {
        let len = self.catalog.provinces().len() as isize;
        let next = self.map.cursor as isize + delta;
        if (0..len).contains(&next) {
            self.map.cursor = next as usize;
        }
    }

    fn move_city_cursor(&mut self, province: usize, delta: isize) {
        let Some(province) = self.catalog.province(province) else {
            return;
        };
        let len = province.cities.len() as isize;
        let next = self.map.city_cursor as isize + delta;
        if (0..len).contains(&next) {
            self.map.city_cursor = next as usize;
        }
    }

    // --- selection sheet ---

    pub fn open_sheet(&mut self, city_id: String, city_name: String) {
        self.sheet = Some(SelectionSheet {
            city_id,
            city_name,
            chosen: None,
            close_in: None,
        });
    }

    /// Writes through to the store, then leaves the sheet up briefly as
    /// visual confirmation before `tick` closes it.
    pub fn sheet_choose(&mut self, level: TravelLevel) {
        let Some(sheet) = &mut self.sheet else { return };
        let city_id = sheet.city_id.clone();
        sheet.chosen = Some(level);
        sheet.close_in = Some(SHEET_CLOSE_TICKS);
        self.store.set(&city_id, level);
    }

    /// Backdrop dismissal: nothing is written.
    pub fn dismiss_sheet(&mut self) {
        self.sheet = None;
    }

    // --- batch update ---

    pub fn batch_set_province(&mut self, index: usize, level: TravelLevel) {
        let Some(province) = self.catalog.province(index) else {
            return;
        };
        let updates: Vec<(String, TravelLevel)> = province
            .cities
            .iter()
            .map(|c| (c.id.clone(), level))
            .collect();
        self.store.set_many(updates);
    }

    // --- reset flow ---

    pub fn begin_reset(&mut self) {
        self.reset = Some(ResetConfirm {
            ticks_left: RESET_COUNTDOWN_TICKS,
        });
    }

    /// Available at any point during the countdown; never touches the store.
    pub fn cancel_reset(&mut self) {
        self.reset = None;
    }

    /// Rejected until the countdown reaches zero. Returns whether the reset
    /// was applied.
    pub fn confirm_reset(&mut self) -> bool {
        match &self.reset {
            Some(confirm) if confirm.armed() => {
                self.store.reset();
                self.reset = None;
                true
            }
            _ => false,
        }
    }

    // --- share ---

    /// Fire-and-forget snapshot export. Failure resets the busy flag and is
    /// logged; progress and view state are never affected.
    pub fn share(&mut self) {
        if self.sharing {
            return;
        }
        self.sharing = true;
        let stats = stats::compute(&self.catalog, &self.store);
        match share::export_snapshot(&self.catalog, &self.store, &stats) {
            Ok(path) => tracing::info!(path = %path.display(), "snapshot exported"),
            Err(err) => tracing::warn!(error = %err, "snapshot export failed"),
        }
        self.sharing = false;
    }

    /// Advances modal timers; called once per poll timeout.
    pub fn tick(&mut self) {
        if let Some(sheet) = &mut self.sheet {
            if let Some(remaining) = sheet.close_in {
                if remaining <= 1 {
                    self.sheet = None;
                } else {
                    sheet.close_in = Some(remaining - 1);
                }
            }
        }
        if let Some(confirm) = &mut self.reset {
            confirm.ticks_left = confirm.ticks_left.saturating_sub(1);
        }
    }

    // --- list view model ---

    /// Total flattened rows: one per province, plus the expanded province's
    /// cities.
    pub fn list_rows(&self) -> usize {
        let expanded = self
            .expanded
            .and_then(|i| self.catalog.province(i))
            .map_or(0, |p| p.cities.len());
        self.catalog.provinces().len() + expanded
    }

    pub fn list_row(&self, row: usize) -> ListRow {
        if let Some(pi) = self.expanded {
            let cities = self.catalog.province(pi).map_or(0, |p| p.cities.len());
            if row > pi {
                if row <= pi + cities {
                    return ListRow::City(pi, row - pi - 1);
                }
                return ListRow::Province(row - cities);
            }
        }
        ListRow::Province(row)
    }

    fn toggle_expand(&mut self, index: usize) {
        self.expanded = if self.expanded == Some(index) {
            None
        } else {
            Some(index)
        };
        // Keep the cursor on the header that was toggled.
        self.list_cursor = index.min(self.list_rows().saturating_sub(1));
    }

    /// City under the map cursor, if a province is focused.
    pub fn focused_city(&self) -> Option<&City> {
        match self.map.focus {
            MapFocus::Province(index) => self
                .catalog
                .province(index)?
                .cities
                .get(self.map.city_cursor),
            MapFocus::Overview => None,
        }
    }
}
