//! All rendering. The views read catalog + store and recompute derived
//! stats on every frame; nothing here mutates application state.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
        canvas::{Canvas, Rectangle},
    },
};

use crate::app::{App, ListRow, MapFocus, ResetConfirm, SelectionSheet, View};
use crate::catalog::WORLD_EXTENT;
use crate::level::TravelLevel;
use crate::stats;

const IOS_BLUE: Color = Color::Rgb(0, 122, 255);
const IOS_GRAY: Color = Color::Rgb(142, 142, 147);

fn level_color(level: TravelLevel) -> Color {
    match level {
        TravelLevel::Untouched => Color::Rgb(229, 229, 234),
        TravelLevel::Passed => Color::Rgb(90, 200, 250),
        TravelLevel::Visited => Color::Rgb(255, 149, 0),
        TravelLevel::Lived => Color::Rgb(255, 59, 48),
    }
}

/// Fill intensity for a province cell: white when untouched, otherwise a
/// blend towards blue proportional to its score ratio.
fn province_color(ratio: f64) -> Color {
    if ratio <= 0.0 {
        return Color::White;
    }
    let t = ratio.clamp(0.0, 1.0);
    let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    Color::Rgb(lerp(242.0, 0.0), lerp(242.0, 122.0), lerp(247.0, 255.0))
}

pub fn draw(f: &mut Frame, app: &App) {
    match app.view {
        View::Map => draw_map_view(f, app),
        View::List => draw_list_view(f, app),
    }
    if let Some(sheet) = &app.sheet {
        draw_sheet(f, app, sheet);
    }
    if let Some(confirm) = &app.reset {
        draw_reset_modal(f, confirm);
    }
    if app.show_help {
        draw_help(f);
    }
}

fn draw_map_view(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)].as_ref())
        .split(f.area());

    draw_stats_card(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)].as_ref())
        .split(chunks[1]);

    draw_map_canvas(f, app, body[0]);
    draw_map_side(f, app, body[1]);
}

fn draw_stats_card(f: &mut Frame, app: &App, area: Rect) {
    let stats = stats::compute(&app.catalog, &app.store);

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" Lv.{} ", stats.level),
                Style::default()
                    .fg(Color::White)
                    .bg(IOS_BLUE)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {}", stats.title),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("   总分 {}", stats.score), Style::default().fg(IOS_GRAY)),
        ]),
        Line::from(vec![
            Span::raw(format!(
                " 足迹 {}省 / {}城   面积 {:.2}万km²   ",
                stats.province_count,
                stats.city_count,
                stats.explored_area_wan_km2()
            )),
            Span::styled(
                format!("覆盖 {:.1}%", stats.coverage_percent),
                Style::default().fg(IOS_BLUE).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let card = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_set(border::ROUNDED)
                .title("ChinaSteps · 记录你的中国足迹"),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(card, area);
}

fn draw_map_canvas(f: &mut Frame, app: &App, area: Rect) {
    let (center, title) = match app.map.focus {
        MapFocus::Overview => (
            (WORLD_EXTENT / 2.0, WORLD_EXTENT / 2.0),
            "中国 · Enter 进入省份".to_string(),
        ),
        MapFocus::Province(index) => {
            let p = &app.catalog.provinces()[index];
            (
                (p.x + p.width / 2.0, WORLD_EXTENT - p.y - p.height / 2.0),
                format!("{} · Enter 标记城市 · Esc 返回", p.name),
            )
        }
    };
    let cx = center.0 + app.map.pan.0;
    let cy = center.1 - app.map.pan.1;
    let half = WORLD_EXTENT / 2.0 / app.map.zoom;

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_set(border::ROUNDED)
                .title(title),
        )
        .x_bounds([cx - half, cx + half])
        .y_bounds([cy - half, cy + half])
        .paint(|ctx| match app.map.focus {
            MapFocus::Overview => {
                for (i, province) in app.catalog.provinces().iter().enumerate() {
                    let ratio = stats::province_ratio(province, &app.store);
                    let selected = i == app.map.cursor;
                    let color = if selected { Color::Yellow } else { province_color(ratio) };
                    ctx.draw(&Rectangle {
                        x: province.x,
                        y: WORLD_EXTENT - province.y - province.height,
                        width: province.width,
                        height: province.height,
                        color,
                    });
                    let style = if selected {
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(color)
                    };
                    ctx.print(
                        province.x + province.width / 2.0 - 8.0,
                        WORLD_EXTENT - province.y - province.height / 2.0,
                        Line::from(Span::styled(province.name.clone(), style)),
                    );
                }
            }
            MapFocus::Province(index) => {
                let province = &app.catalog.provinces()[index];
                ctx.draw(&Rectangle {
                    x: province.x,
                    y: WORLD_EXTENT - province.y - province.height,
                    width: province.width,
                    height: province.height,
                    color: IOS_BLUE,
                });
                for (c, city) in province.cities.iter().enumerate() {
                    let level = app.store.get(&city.id);
                    let selected = c == app.map.city_cursor;
                    let color = if selected { Color::Yellow } else { level_color(level) };
                    let x = province.x + city.x;
                    let y = WORLD_EXTENT - province.y - city.y;
                    ctx.draw(&Rectangle {
                        x: x - 3.0,
                        y: y - 2.0,
                        width: 6.0,
                        height: 4.0,
                        color,
                    });
                    ctx.print(
                        x - 3.0,
                        y - 5.0,
                        Line::from(Span::styled(city.name.clone(), Style::default().fg(color))),
                    );
                }
            }
        });

    f.render_widget(canvas, area);
}

fn draw_map_side(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(area);

    let info_text = match app.map.focus {
        MapFocus::Overview => {
            let province = &app.catalog.provinces()[app.map.cursor];
            let lit = stats::province_hits(province, &app.store);
            format!(
                "{} ({})\n\n面积: {:.0} km²\n点亮: {}/{} 城\n\nEnter 进入省份",
                province.name,
                province.abbreviation,
                province.area_km2,
                lit,
                province.cities.len()
            )
        }
        MapFocus::Province(_) => match app.focused_city() {
            Some(city) => {
                let level = app.store.get(&city.id);
                format!(
                    "{}\n\n当前: {}\n\nEnter 标记足迹\nEsc 返回全国",
                    city.name,
                    level.label()
                )
            }
            None => String::new(),
        },
    };

    let info = Paragraph::new(info_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_set(border::ROUNDED)
                .title("当前选中"),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(info, chunks[0]);

    let hint = Paragraph::new(
        "方向键 选择\n+/- 缩放\nw/a/s/d 平移\nTab 列表视图\nx 导出分享\nh 帮助  q 退出",
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .title("操作"),
    )
    .wrap(Wrap { trim: true });
    f.render_widget(hint, chunks[1]);
}

fn draw_list_view(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(f.area());

    let items: Vec<ListItem> = (0..app.list_rows())
        .map(|row| match app.list_row(row) {
            ListRow::Province(pi) => {
                let province = &app.catalog.provinces()[pi];
                let lit = stats::province_hits(province, &app.store);
                let marker = if app.expanded == Some(pi) { "▾" } else { "▸" };
                let style = if lit > 0 {
                    Style::default().fg(IOS_BLUE)
                } else {
                    Style::default().fg(IOS_GRAY)
                };
                ListItem::new(format!(
                    "{} {} · 点亮 {}/{} 城",
                    marker,
                    province.name,
                    lit,
                    province.cities.len()
                ))
                .style(style)
            }
            ListRow::City(pi, ci) => {
                let city = &app.catalog.provinces()[pi].cities[ci];
                let level = app.store.get(&city.id);
                ListItem::new(format!("    {}  {}", city.name, level.label()))
                    .style(Style::default().fg(level_color(level)))
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_set(border::ROUNDED)
                .title("足迹列表"),
        )
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray));

    let mut list_state = ListState::default();
    list_state.select(Some(app.list_cursor));
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[1]);

    let info_text = match app.list_row(app.list_cursor) {
        ListRow::Province(pi) => {
            let province = &app.catalog.provinces()[pi];
            let lit = stats::province_hits(province, &app.store);
            format!(
                "{} ({})\n面积: {:.0} km²\n点亮: {}/{} 城\n\nEnter 展开/收起\n0-3 全省统一设置",
                province.name,
                province.abbreviation,
                province.area_km2,
                lit,
                province.cities.len()
            )
        }
        ListRow::City(pi, ci) => {
            let province = &app.catalog.provinces()[pi];
            let city = &province.cities[ci];
            let level = app.store.get(&city.id);
            format!(
                "{} · {}\n当前: {}\n\nEnter 打开足迹选择\n0-3 直接设置等级",
                province.name,
                city.name,
                level.label()
            )
        }
    };

    let info = Paragraph::new(info_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_set(border::ROUNDED)
                .title("详情"),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(info, right_chunks[0]);

    let hint = Paragraph::new(
        "↑/↓ (j/k) 移动\nEnter 展开 / 选择\n0 未涉足  1 路过\n2 游玩  3 长住\nr 重置所有数据\nTab 地图视图  q 退出",
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .title("操作"),
    )
    .wrap(Wrap { trim: true });
    f.render_widget(hint, right_chunks[1]);
}

fn draw_sheet(f: &mut Frame, app: &App, sheet: &SelectionSheet) {
    let area = popup_area(f.area(), 44, 12);
    f.render_widget(Clear, area);

    let current = app.store.get(&sheet.city_id);
    let mut lines = vec![Line::from(""), Line::from(" 你在这座城市的足迹?"), Line::from("")];
    for level in TravelLevel::ALL {
        let active = sheet.chosen.map_or(current == level, |chosen| chosen == level);
        let mark = if active { "●" } else { "○" };
        let style = if active {
            Style::default()
                .fg(level_color(level))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(IOS_GRAY)
        };
        lines.push(Line::from(Span::styled(
            format!("   {} {}  {}", mark, level.ordinal(), level.label()),
            style,
        )));
    }
    lines.push(Line::from(""));
    let footer = if sheet.chosen.is_some() {
        Span::styled(" ✓ 已记录", Style::default().fg(IOS_BLUE))
    } else {
        Span::styled(" 按 0-3 选择 · Esc 关闭", Style::default().fg(IOS_GRAY))
    };
    lines.push(Line::from(footer));

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .title(sheet.city_name.clone()),
    );
    f.render_widget(popup, area);
}

fn draw_reset_modal(f: &mut Frame, confirm: &ResetConfirm) {
    let area = popup_area(f.area(), 46, 9);
    f.render_widget(Clear, area);

    let action = if confirm.armed() {
        Span::styled(
            " Enter 确认清空",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            format!(" 确认 ({}s)", confirm.seconds_left()),
            Style::default().fg(IOS_GRAY),
        )
    };

    let lines = vec![
        Line::from(""),
        Line::from(" 此操作不可恢复，您记录的所有城市"),
        Line::from(" 足迹数据都将永久丢失。"),
        Line::from(""),
        Line::from(vec![action, Span::styled("   Esc 取消", Style::default().fg(IOS_GRAY))]),
    ];

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_set(border::ROUNDED)
            .title("确定要清空吗？")
            .title_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(popup, area);
}

fn draw_help(f: &mut Frame) {
    let area = popup_area(f.area(), 50, 16);
    f.render_widget(Clear, area);

    let text = "Tab: 切换地图/列表视图\n\
        方向键: 移动光标\n\
        Enter: 进入省份 / 标记城市\n\
        Esc/Backspace: 返回全国视图\n\
        +/-: 缩放 (缩小过头自动返回)\n\
        w/a/s/d: 平移地图\n\
        0-3: 设置等级 (列表中省行为全省设置)\n\
        r: 重置所有数据 (3 秒确认)\n\
        x: 导出分享快照到主目录\n\
        h/F1: 帮助  q: 退出\n\n\
        等级: 0 未涉足 · 1 路过 · 2 游玩 · 3 长住";

    let popup = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_set(border::ROUNDED)
                .title("帮助"),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(popup, area);
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: (area.width.saturating_sub(width)) / 2,
        y: (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}
