//! Interactive terminal front end: key handling, screens, and the session loop.
//!
//! The engine never touches the terminal. This module reads one key at a
//! time, turns it into a [`Command`], hands moves to [`Game::play`], and
//! redraws. Screens are written with `queue!` into any `Write`, so they can
//! be rendered into a buffer as well as to stdout.

use std::io::{self, Stdout, Write};

use chrono::Local;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use rand::Rng;

use crate::engine::{Game, Move, Tile, SIZE};
use crate::scores::{HighScores, ScoreStore};

const BOARD_X: u16 = 15;
const CELL_WIDTH: u16 = 6;

const BOARD_LINES: [&str; 9] = [
    "┌─────┬─────┬─────┬─────┐",
    "│     │     │     │     │",
    "├─────┼─────┼─────┼─────┤",
    "│     │     │     │     │",
    "├─────┼─────┼─────┼─────┤",
    "│     │     │     │     │",
    "├─────┼─────┼─────┼─────┤",
    "│     │     │     │     │",
    "└─────┴─────┴─────┴─────┘",
];

/// What a key press asks the shell to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Move),
    HighScores,
    Quit,
}

/// Choice offered on the high score and game over screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    Continue,
    Quit,
}

/// Map a key to a command. Unknown keys map to `None` and are ignored.
pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('z') => Some(Command::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Up => Some(Command::Move(Move::Up)),
        KeyCode::Down => Some(Command::Move(Move::Down)),
        KeyCode::Left => Some(Command::Move(Move::Left)),
        KeyCode::Right => Some(Command::Move(Move::Right)),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Some(Command::Move(Move::Up)),
            's' => Some(Command::Move(Move::Down)),
            'a' => Some(Command::Move(Move::Left)),
            'd' => Some(Command::Move(Move::Right)),
            'h' => Some(Command::HighScores),
            'q' => Some(Command::Quit),
            _ => None,
        },
        _ => None,
    }
}

/// Foreground and background colours for a tile.
pub fn tile_colors(value: Tile) -> (Color, Color) {
    match value {
        2 => (Color::Black, Color::White),
        4 => (Color::Black, Color::Rgb { r: 237, g: 224, b: 200 }),
        8 => (Color::White, Color::Rgb { r: 242, g: 177, b: 121 }),
        16 => (Color::White, Color::Rgb { r: 245, g: 149, b: 99 }),
        32 => (Color::White, Color::Rgb { r: 246, g: 124, b: 95 }),
        64 => (Color::White, Color::Rgb { r: 246, g: 94, b: 59 }),
        128 => (Color::White, Color::Rgb { r: 237, g: 207, b: 114 }),
        256 => (Color::White, Color::Rgb { r: 237, g: 204, b: 97 }),
        512 => (Color::White, Color::Rgb { r: 237, g: 200, b: 80 }),
        1024 => (Color::White, Color::Rgb { r: 237, g: 197, b: 63 }),
        2048 => (Color::White, Color::Rgb { r: 237, g: 194, b: 46 }),
        _ => (Color::White, Color::Rgb { r: 60, g: 58, b: 50 }),
    }
}

/// Raw mode plus alternate screen for as long as the guard lives.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter(out: &mut Stdout) -> io::Result<Self> {
        // constructed first so a failure below still restores the terminal
        let guard = TerminalGuard;
        execute!(out, EnterAlternateScreen, cursor::Hide)?;
        terminal::enable_raw_mode()?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
    }
}

/// Line-oriented writer over a cleared screen. Raw mode ignores `\n`, so
/// every line is placed with an explicit cursor move.
struct Screen<'a, W: Write> {
    out: &'a mut W,
    y: u16,
}

impl<'a, W: Write> Screen<'a, W> {
    fn clear(out: &'a mut W) -> io::Result<Self> {
        queue!(out, terminal::Clear(ClearType::All))?;
        Ok(Screen { out, y: 0 })
    }

    fn text_at(&mut self, x: u16, color: Color, text: &str) -> io::Result<()> {
        queue!(self.out, cursor::MoveTo(x, self.y), SetForegroundColor(color), Print(text), ResetColor)
    }

    fn bold_at(&mut self, x: u16, color: Color, text: &str) -> io::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(x, self.y),
            SetAttribute(Attribute::Bold),
            SetForegroundColor(color),
            Print(text),
            SetAttribute(Attribute::Reset),
            ResetColor
        )
    }

    fn line(&mut self, color: Color, text: &str) -> io::Result<()> {
        self.text_at(0, color, text)?;
        self.y += 1;
        Ok(())
    }

    fn bold_line(&mut self, color: Color, text: &str) -> io::Result<()> {
        self.bold_at(0, color, text)?;
        self.y += 1;
        Ok(())
    }

    fn rule(&mut self, ch: &str, width: usize) -> io::Result<()> {
        self.line(Color::Cyan, &ch.repeat(width))
    }

    fn skip(&mut self, lines: u16) {
        self.y += lines;
    }

    fn finish(self) -> io::Result<()> {
        self.out.flush()
    }
}

/// One interactive session: the current game, the score table, and the
/// random source feeding the spawner.
pub struct GameUI<R> {
    game: Game,
    high_scores: HighScores,
    store: Option<ScoreStore>,
    rng: R,
}

impl<R: Rng> GameUI<R> {
    pub fn new(store: Option<ScoreStore>, mut rng: R) -> Self {
        let high_scores = store.as_ref().map(ScoreStore::load_or_default).unwrap_or_default();
        let game = Game::new(&mut rng);
        Self { game, high_scores, store, rng }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Drive the session until the player quits.
    pub fn run(&mut self) -> io::Result<()> {
        let mut out = io::stdout();
        let _guard = TerminalGuard::enter(&mut out)?;
        info!("session started");

        self.draw_welcome(&mut out)?;
        wait_for_key()?;

        loop {
            self.draw_board(&mut out)?;

            if self.game.game_over() {
                let rank = self.finish_game();
                self.draw_final(&mut out, rank)?;
                if wait_for_choice()? == ScreenAction::Quit {
                    break;
                }
                self.game = Game::new(&mut self.rng);
                info!("new game started");
                self.draw_welcome(&mut out)?;
                wait_for_key()?;
                continue;
            }

            match next_command()? {
                Some(Command::Move(dir)) => {
                    self.game.play(dir, &mut self.rng);
                }
                Some(Command::HighScores) => {
                    self.draw_high_scores(&mut out)?;
                    if wait_for_choice()? == ScreenAction::Quit {
                        break;
                    }
                }
                Some(Command::Quit) => break,
                None => {}
            }
        }

        info!("session ended with score {}", self.game.score());
        Ok(())
    }

    /// Record the finished game if it makes the table, then persist.
    /// Returns the rank it landed at.
    fn finish_game(&mut self) -> Option<usize> {
        let result = self.game.result();
        if !self.high_scores.is_new_high_score(result.score) {
            return None;
        }
        let rank = self.high_scores.record(result, Local::now().naive_local());
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.high_scores) {
                warn!("could not save high scores to {}: {e}", store.path().display());
            }
        }
        rank
    }

    fn draw_welcome<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut screen = Screen::clear(out)?;
        screen.rule("=", 60)?;
        screen.bold_at(20, Color::Yellow, "🌟 TERMINAL 2048! 🌟")?;
        screen.skip(1);
        screen.rule("=", 60)?;
        screen.skip(1);

        screen.text_at(0, Color::White, "Goal:")?;
        screen.text_at(6, Color::Green, "Combine tiles to reach 2048!")?;
        screen.skip(2);

        screen.line(Color::White, "Controls:")?;
        screen.line(Color::Blue, "  W/↑ - Up    S/↓ - Down")?;
        screen.line(Color::Blue, "  A/← - Left  D/→ - Right")?;
        screen.line(Color::Blue, "  Q - Quit    H - High Scores")?;
        screen.skip(1);

        for line in [
            "✨ 2048 is a popular puzzle game where players combine",
            "✨ tiles with numerical values to create a single tile",
            "✨ with the value of 2048.",
            "✨ The game requires strategic thinking and planning",
            "✨ to achieve the goal.",
        ] {
            screen.line(Color::Yellow, line)?;
        }
        screen.skip(1);

        if let Some(best) = self.high_scores.best() {
            screen.line(Color::Cyan, &format!("Current High Score: {}", best.score))?;
            screen.skip(1);
        }
        screen.line(Color::DarkGrey, "Press any key to start...")?;
        screen.finish()
    }

    fn draw_board<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut screen = Screen::clear(out)?;
        screen.rule("=", 55)?;
        screen.bold_at(20, Color::Yellow, "🎮 2048 GAME 🎮")?;
        screen.skip(1);
        screen.rule("=", 55)?;
        screen.skip(1);

        let score = self.game.score();
        let mut status = format!("Score: {score}");
        if let Some(best) = self.high_scores.best() {
            status.push_str(&format!("  |  High Score: {}", best.score));
            if score > 0 && self.high_scores.is_new_high_score(score) {
                match self.high_scores.rank_of(score) {
                    1 => status.push_str("  |  🔥 NEW RECORD! 🔥"),
                    rank => status.push_str(&format!("  |  #{rank} High Score!")),
                }
            }
        }
        screen.bold_line(Color::Green, &status)?;
        screen.line(Color::White, "Use WASD or Arrow Keys • Q to quit • H for high scores")?;
        screen.rule("-", 55)?;

        let board_y = screen.y;
        for line in BOARD_LINES {
            screen.text_at(BOARD_X, Color::White, line)?;
            screen.skip(1);
        }
        for r in 0..SIZE {
            for c in 0..SIZE {
                let value = self.game.board().get(r, c);
                if value == 0 {
                    continue;
                }
                let (fg, bg) = tile_colors(value);
                queue!(
                    screen.out,
                    cursor::MoveTo(BOARD_X + 1 + c as u16 * CELL_WIDTH, board_y + 1 + r as u16 * 2),
                    SetBackgroundColor(bg),
                    SetForegroundColor(fg),
                    Print(format!("{:^5}", value)),
                    ResetColor
                )?;
            }
        }

        if self.game.game_over() {
            screen.bold_line(Color::Red, "💀 Game Over! No more moves available.")?;
            screen.skip(1);
        } else if self.game.won() {
            screen.bold_line(Color::Yellow, "🎉 Congratulations! You reached 2048! 🎉")?;
            screen.line(Color::Green, "Keep playing to get an even higher score!")?;
        } else {
            screen.skip(2);
        }
        screen.rule("-", 55)?;
        if !self.game.game_over() {
            screen.line(Color::DarkGrey, "Press a key to move...")?;
        }
        screen.finish()
    }

    fn draw_high_scores<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut screen = Screen::clear(out)?;
        self.write_score_table(&mut screen)?;
        screen.skip(1);
        screen.line(Color::DarkGrey, "Press 'Q' to quit, or any other key to continue...")?;
        screen.finish()
    }

    fn draw_final<W: Write>(&self, out: &mut W, rank: Option<usize>) -> io::Result<()> {
        let mut screen = Screen::clear(out)?;
        screen.rule("=", 60)?;
        screen.bold_line(Color::Yellow, "🎮 GAME OVER 🎮")?;
        screen.rule("=", 60)?;
        screen.skip(1);
        screen.line(Color::White, &format!("Final Score: {}", self.game.score()))?;
        screen.line(Color::White, &format!("Highest Tile: {}", self.game.highest_tile()))?;
        screen.skip(1);
        match rank {
            Some(1) => screen.bold_line(Color::Yellow, "🏆 CONGRATULATIONS! NEW HIGH SCORE RECORD! 🏆")?,
            Some(rank) => screen.line(Color::Green, &format!("🎯 Congratulations! New High Score #{rank}! 🎯"))?,
            None => {
                if let Some(best) = self.high_scores.best() {
                    screen.line(Color::Cyan, &format!("High Score to Beat: {}", best.score))?;
                }
            }
        }
        screen.skip(1);
        self.write_score_table(&mut screen)?;
        screen.skip(1);
        screen.line(Color::DarkGrey, "Press 'Q' to quit, or any other key to play again...")?;
        screen.finish()
    }

    fn write_score_table<W: Write>(&self, screen: &mut Screen<'_, W>) -> io::Result<()> {
        screen.bold_line(Color::Yellow, "🏆 HIGH SCORES 🏆")?;
        screen.rule("=", 65)?;
        if self.high_scores.is_empty() {
            screen.line(Color::DarkGrey, "No high scores yet. Be the first!")?;
        } else {
            let header = format!("{:<4} {:<8} {:<12} {:<19}", "Rank", "Score", "Highest Tile", "Date");
            screen.bold_line(Color::White, &header)?;
            screen.rule("-", 65)?;
            for (i, entry) in self.high_scores.entries().iter().enumerate() {
                let rank_color = if i < 3 { Color::Yellow } else { Color::White };
                let tile_color = if entry.highest_tile >= 2048 { Color::Green } else { Color::Cyan };
                screen.text_at(0, rank_color, &format!("{:<4}", i + 1))?;
                screen.text_at(5, Color::White, &format!("{:<8}", entry.score))?;
                screen.text_at(14, tile_color, &format!("{:<12}", entry.highest_tile))?;
                screen.text_at(27, Color::DarkGrey, &format!("{:<19}", entry.date))?;
                screen.skip(1);
            }
        }
        screen.rule("=", 65)
    }
}

fn read_key() -> io::Result<KeyEvent> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(key);
            }
        }
    }
}

fn wait_for_key() -> io::Result<()> {
    read_key().map(|_| ())
}

fn wait_for_choice() -> io::Result<ScreenAction> {
    match command_for(read_key()?) {
        Some(Command::Quit) => Ok(ScreenAction::Quit),
        _ => Ok(ScreenAction::Continue),
    }
}

fn next_command() -> io::Result<Option<Command>> {
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(command_for(key)),
        _ => Ok(None),
    }
}
