use ratatui::Frame;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};

use super::Palette;
use super::summary::stats_lines;
use crate::vm::{ChoiceLine, ChoiceMark, QuizScreen};

const QUESTION_HELP: &str = "up/down or j/k move, 1-9 pick, enter confirm, q quit";
const ANSWER_HELP: &str = "Press enter or n for next question";
const DONE_HELP: &str = "Press any key to exit";

/// Draw one quiz frame.
pub fn render_quiz(frame: &mut Frame, screen: &QuizScreen) {
    let lines = match screen {
        QuizScreen::Question {
            position,
            total,
            prompt,
            choices,
            notice,
        } => {
            let mut lines = header(*position, *total, prompt);
            lines.extend(choices.iter().map(choice_line));
            lines.push(Line::default());
            if let Some(notice) = notice {
                lines.push(Line::styled(notice.clone(), Palette::bad_style()));
            }
            lines.push(Line::styled(QUESTION_HELP, Palette::help_style()));
            lines
        }
        QuizScreen::Answer {
            position,
            total,
            prompt,
            choices,
            was_correct,
            explanation,
        } => {
            let mut lines = header(*position, *total, prompt);
            lines.extend(choices.iter().map(choice_line));
            lines.push(Line::default());
            lines.push(if *was_correct {
                Line::styled("Correct!", Palette::good_style())
            } else {
                Line::styled("Not quite.", Palette::bad_style())
            });
            if let Some(explanation) = explanation {
                lines.push(Line::raw(explanation.clone()));
            }
            lines.push(Line::default());
            lines.push(Line::styled(ANSWER_HELP, Palette::help_style()));
            lines
        }
        QuizScreen::Summary(stats) => {
            let mut lines = vec![
                Line::styled("Quiz completed! Great job!", Palette::title_style()),
                Line::default(),
            ];
            lines.extend(stats_lines(stats).into_iter().map(Line::raw));
            lines.push(Line::default());
            lines.push(Line::styled(DONE_HELP, Palette::help_style()));
            lines
        }
        QuizScreen::Ended => vec![
            Line::raw("Quiz ended."),
            Line::default(),
            Line::styled(DONE_HELP, Palette::help_style()),
        ],
    };

    let block = Block::bordered().title(Span::styled(" Total Recall ", Palette::title_style()));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, frame.area());
}

fn header(position: usize, total: usize, prompt: &str) -> Vec<Line<'static>> {
    vec![
        Line::styled(format!("Question {position}/{total}"), Palette::help_style()),
        Line::styled(prompt.to_owned(), Palette::title_style()),
        Line::default(),
    ]
}

fn choice_line(choice: &ChoiceLine) -> Line<'static> {
    let label = format!("{}. {}", choice.number, choice.text);
    match choice.mark {
        ChoiceMark::Plain => Line::raw(format!("  {label}")),
        ChoiceMark::Cursor => Line::styled(format!("> {label}"), Palette::cursor_style()),
        ChoiceMark::Correct => Line::styled(format!("  {label} ✓"), Palette::good_style()),
        ChoiceMark::Wrong => Line::styled(format!("  {label} ✗"), Palette::bad_style()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use recall_core::model::{CourseId, QuizStats};

    fn draw(screen: &QuizScreen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 20)).unwrap();
        terminal
            .draw(|frame| render_quiz(frame, screen))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn choices(marks: &[ChoiceMark]) -> Vec<ChoiceLine> {
        ["Paris", "Rome", "Madrid"]
            .iter()
            .zip(marks)
            .enumerate()
            .map(|(i, (text, mark))| ChoiceLine {
                number: i + 1,
                text: (*text).to_owned(),
                mark: *mark,
            })
            .collect()
    }

    #[test]
    fn question_frame_shows_cursor_and_notice() {
        let text = draw(&QuizScreen::Question {
            position: 1,
            total: 3,
            prompt: "Capital of France?".into(),
            choices: choices(&[ChoiceMark::Plain, ChoiceMark::Cursor, ChoiceMark::Plain]),
            notice: Some("There is no choice 7.".into()),
        });
        assert!(text.contains("Total Recall"));
        assert!(text.contains("Question 1/3"));
        assert!(text.contains("Capital of France?"));
        assert!(text.contains("  1. Paris"));
        assert!(text.contains("> 2. Rome"));
        assert!(text.contains("There is no choice 7."));
        assert!(text.contains("enter confirm"));
    }

    #[test]
    fn answer_frame_marks_choices() {
        let text = draw(&QuizScreen::Answer {
            position: 2,
            total: 3,
            prompt: "Capital of France?".into(),
            choices: choices(&[ChoiceMark::Correct, ChoiceMark::Wrong, ChoiceMark::Plain]),
            was_correct: false,
            explanation: Some("Paris has been the capital since 987.".into()),
        });
        assert!(text.contains("1. Paris ✓"));
        assert!(text.contains("2. Rome ✗"));
        assert!(text.contains("Not quite."));
        assert!(text.contains("Paris has been the capital since 987."));
        assert!(text.contains("Press enter or n for next question"));
    }

    #[test]
    fn summary_and_ended_frames() {
        let stats = QuizStats::new(CourseId::new("C1").unwrap(), 3, 4, 3).unwrap();
        let text = draw(&QuizScreen::Summary(stats));
        assert!(text.contains("Quiz completed! Great job!"));
        assert!(text.contains("Course:          C1"));
        assert!(text.contains("Correctness:     75.0%"));

        let text = draw(&QuizScreen::Ended);
        assert!(text.contains("Quiz ended."));
        assert!(!text.contains("Correctness"));
    }
}
