use crate::application::{App, AppMode, Focus, MODAL_TITLE};
use crate::domain::{FieldKind, FieldSpec, Route};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};

/// Rows taken by one field: label, value and the inline error.
const FIELD_HEIGHT: u16 = 4;

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_form(f, app, chunks[1]);
    render_status_bar(f, app, chunks[2]);

    match app.mode {
        AppMode::Choosing => render_choice_popup(f, app),
        AppMode::Modal => render_modal(f, app),
        AppMode::Help => render_help_popup(f, app.help_scroll),
        AppMode::Normal | AppMode::Editing => {}
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!(
        "Заявка на займ | Шаг {} из {}: {} | {}",
        app.route.step(),
        Route::ALL.len(),
        app.route.title(),
        app.route.path()
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(app.route.title());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let fields = app.current_fields();
    let mut constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(FIELD_HEIGHT))
        .collect();
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(inner);

    for (index, spec) in fields.iter().enumerate() {
        let focused = app.focus == Focus::Field(index);
        render_field(f, app, spec, focused, rows[index]);
    }
    render_buttons(f, app, rows[fields.len()]);
}

fn render_field(f: &mut Frame, app: &App, spec: &FieldSpec, focused: bool, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let error = app.errors.get(spec.name).copied();
    let label_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    };

    match spec.kind {
        FieldKind::Range(range) => {
            let value: u32 = app.field_value(spec.name).parse().unwrap_or(range.min);
            let caption = format!("{}: {}", spec.label, range_value_text(spec.name, value));
            f.render_widget(Paragraph::new(caption).style(label_style), parts[0]);

            let gauge_style = if focused {
                Style::default().fg(Color::Blue).bg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Gray).bg(Color::DarkGray)
            };
            let gauge = Gauge::default()
                .gauge_style(gauge_style)
                .ratio(range.ratio(value))
                .label(format!("{} ◂ ▸ {}", range.min, range.max));
            f.render_widget(gauge, parts[1]);
        }
        FieldKind::Text | FieldKind::Phone | FieldKind::Select => {
            f.render_widget(Paragraph::new(spec.label).style(label_style), parts[0]);

            let editing = focused && app.mode == AppMode::Editing;
            let text = if editing {
                app.input.clone()
            } else {
                app.display_value(spec)
            };
            let empty = app.field_value(spec.name).is_empty();
            let mut value_style = if editing {
                Style::default().fg(Color::Green)
            } else if focused {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else if empty {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            if error.is_some() && !focused {
                value_style = value_style.fg(Color::Red);
            }
            let marker = if spec.kind == FieldKind::Select { " ▾" } else { "" };
            let value = Paragraph::new(Line::from(vec![
                Span::raw("> "),
                Span::styled(format!("{text}{marker}"), value_style),
            ]));
            f.render_widget(value, parts[1]);

            if editing {
                let x = parts[1].x + 2 + app.cursor_position as u16;
                f.set_cursor_position((x.min(parts[1].right().saturating_sub(1)), parts[1].y));
            }
        }
    }

    if let Some(message) = error {
        f.render_widget(
            Paragraph::new(message).style(Style::default().fg(Color::Red)),
            parts[2],
        );
    }
}

/// Slider caption value with its unit.
fn range_value_text(name: &str, value: u32) -> String {
    match name {
        "loanAmount" => format!("{value}₽"),
        "loanTerm" => format!("{value} дней"),
        _ => value.to_string(),
    }
}

fn render_buttons(f: &mut Frame, app: &App, area: Rect) {
    let button = |label: &str, focus: Focus| {
        let style = if app.focus == focus {
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        };
        Span::styled(format!(" {label} "), style)
    };

    let mut spans = Vec::new();
    if app.route.previous().is_some() {
        spans.push(button("Назад", Focus::Back));
        spans.push(Span::raw("  "));
    }
    let submit_label = if app.route.next().is_some() {
        "Далее"
    } else {
        "Подать заявку"
    };
    spans.push(button(submit_label, Focus::Submit));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                "↑↓/Tab: поле | Enter: изменить | ←→: ползунок | PgDn: далее | PgUp: назад | F1/?: справка | q: выход".to_string()
            }
        }
        AppMode::Editing => "Ввод: Enter - готово, Esc - отменить изменения".to_string(),
        AppMode::Choosing => "↑↓: выбор | Enter: подтвердить | Esc: отмена".to_string(),
        AppMode::Modal => "Enter/Esc: закрыть".to_string(),
        AppMode::Help => "↑↓/jk: прокрутка | PgUp/PgDn: быстрее | Home: в начало | Esc/q: закрыть".to_string(),
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Статус"))
        .style(match app.mode {
            AppMode::Normal if app.status_message.is_some() => Style::default().fg(Color::Red),
            AppMode::Normal => Style::default(),
            AppMode::Editing => Style::default().fg(Color::Green),
            AppMode::Choosing => Style::default().fg(Color::Yellow),
            AppMode::Modal => Style::default().fg(Color::Magenta),
            AppMode::Help => Style::default().fg(Color::Cyan),
        });
    f.render_widget(input, area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_choice_popup(f: &mut Frame, app: &App) {
    let Some(spec) = app.focused_field() else {
        return;
    };
    let options = app.select_options(spec.name);
    let popup_area = centered_rect(f.area(), 40, options.len() as u16 + 2);
    f.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = options
        .into_iter()
        .map(|(_, label)| ListItem::new(label))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(spec.label))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.choice_index));
    f.render_stateful_widget(list, popup_area, &mut state);
}

fn render_modal(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(f.area(), 60, 7);
    f.render_widget(Clear, popup_area);

    let message = app.modal_message.clone().unwrap_or_default();
    let modal = Paragraph::new(vec![
        Line::from(message),
        Line::from(""),
        Line::from(Span::styled(" Закрыть ", Style::default().bg(Color::DarkGray))),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(MODAL_TITLE)
            .style(Style::default().fg(Color::Green)),
    );
    f.render_widget(modal, popup_area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("Справка (строка {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"ЗАЯВКА НА ЗАЙМ

=== ШАГИ ===
1. Личные данные        телефон, имя, фамилия, пол
2. Адрес и место работы  место работы из каталога, адрес проживания
3. Параметры займа      сумма 200-1000₽ (шаг 100), срок 10-30 дней

Все введённые значения сохраняются сразу и восстанавливаются
при следующем запуске.

=== НАВИГАЦИЯ ===
↑↓ / Tab / Shift+Tab    Перейти к другому полю или кнопке
Enter / F2              Изменить поле, открыть список, нажать кнопку
← →                     Передвинуть ползунок
PgDn / Ctrl+N           Далее (или подать заявку на последнем шаге)
PgUp / Ctrl+B           Назад без проверки полей
q / Esc                 Выход

=== ВВОД ===
Enter / Tab             Готово
Esc                     Отменить изменения поля
Backspace / Delete      Удалить символ
Home / End / ← →        Переместить курсор

Телефон вводится цифрами и форматируется как +7 (999) 999 9999.
Цифры добавляются только в конец номера: курсор не перемещается,
Backspace удаляет последнюю цифру, Delete не действует.

=== СПРАВКА ===
↑↓ или j/k              Прокрутка на одну строку
PgUp / PgDn             Прокрутка на 5 строк
Home                    В начало
Esc/F1/?/q              Закрыть справку"#;
