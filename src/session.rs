// File: src/session.rs
//! Interactive command interpreter behind the `clue_engine` binary.

use crate::core::engine::{ClueBot, DEFAULT_CLUE_COUNT};
use crate::core::text::{denormalize, normalize, order_suffix};
use crate::core::types::{Category, ValuationItem};
use crate::error::Result;
use crate::similarity::SimilarityEngine;
use crossterm::style::Stylize;
use std::io::Write;

const SIMILAR_WORD_COUNT: usize = 10;

/// The team the clue giver plays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamColor {
    Red,
    Blue,
}

impl TeamColor {
    /// Accepts `r`, `red`, `b` or `blue` in any case.
    pub fn parse(input: &str) -> Option<Self> {
        match normalize(input.trim()).as_str() {
            "r" | "red" => Some(TeamColor::Red),
            "b" | "blue" => Some(TeamColor::Blue),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            TeamColor::Red => 'r',
            TeamColor::Blue => 'b',
        }
    }

    pub fn other(self) -> Self {
        match self {
            TeamColor::Red => TeamColor::Blue,
            TeamColor::Blue => TeamColor::Red,
        }
    }

    /// Category of a card colour letter as seen by this team.
    pub fn category_of(self, letter: &str) -> Option<Category> {
        match letter {
            "r" | "b" if letter.starts_with(self.letter()) => Some(Category::Own),
            "r" | "b" => Some(Category::Opponent),
            "g" | "c" => Some(Category::Civilian),
            "a" => Some(Category::Assassin),
            _ => None,
        }
    }

    /// Letter used for a category in machine-readable output.
    pub fn letter_for(self, category: Category) -> char {
        match category {
            Category::Own => self.letter(),
            Category::Opponent => self.other().letter(),
            Category::Civilian => 'c',
            Category::Assassin => 'a',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(Category, String),
    Remove(String),
    Suggest,
    Score(String),
    Similar(String),
    Board,
    Reset,
    Help,
    Quit,
    MissingWord(String),
    Unknown(String),
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    /// The argument is normalized, so "Ice Cream" becomes `ice_cream`.
    pub fn parse(line: &str, color: TeamColor) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let head = normalize(head);
        let word = normalize(rest.trim());

        let needs_word = |make: fn(String) -> Command| {
            if word.is_empty() {
                Command::MissingWord(head.clone())
            } else {
                make(word.clone())
            }
        };

        let command = match head.as_str() {
            "-" => needs_word(Command::Remove),
            "go" | "play" => Command::Suggest,
            "score" => needs_word(Command::Score),
            "similar" => needs_word(Command::Similar),
            "board" => Command::Board,
            "reset" => Command::Reset,
            "help" | "\"help\"" => Command::Help,
            "quit" | "exit" => Command::Quit,
            letter => match color.category_of(letter) {
                Some(_) if word.is_empty() => Command::MissingWord(head.clone()),
                Some(category) => Command::Add(category, word.clone()),
                None => Command::Unknown(head.clone()),
            },
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct GameSession<E> {
    bot: ClueBot<E>,
    color: TeamColor,
}

impl<E: SimilarityEngine> GameSession<E> {
    pub fn new(bot: ClueBot<E>, color: TeamColor) -> Self {
        Self { bot, color }
    }

    pub fn bot(&self) -> &ClueBot<E> {
        &self.bot
    }

    pub fn color(&self) -> TeamColor {
        self.color
    }

    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow> {
        match command {
            Command::Add(category, word) => self.add_word(category, &word, out)?,
            Command::Remove(word) => self.remove_word(&word)?,
            Command::Suggest => self.suggest(out)?,
            Command::Score(word) => self.score(&word, out)?,
            Command::Similar(word) => self.similar(&word, out)?,
            Command::Board => self.print_board(out)?,
            Command::Reset => self.bot.clear_board(),
            Command::Help => print_help(out)?,
            Command::Quit => return Ok(Flow::Quit),
            Command::MissingWord(cmd) => writeln!(out, "Usage: {} <word>", cmd)?,
            Command::Unknown(cmd) => writeln!(out, "Unknown command \"{}\"", cmd)?,
        }
        Ok(Flow::Continue)
    }

    fn lists(&self) -> [Vec<String>; 4] {
        Category::ALL.map(|category| self.bot.board().texts(category).to_vec())
    }

    fn rebuild(&mut self, lists: [Vec<String>; 4]) -> Result<()> {
        let [own, opponent, civilian, assassin] = lists;
        self.bot
            .set_words(own.as_slice(), opponent.as_slice(), civilian.as_slice(), assassin.as_slice())
    }

    fn add_word<W: Write>(&mut self, category: Category, word: &str, out: &mut W) -> Result<()> {
        if !self.bot.engine().word_exists(word) {
            writeln!(out, "{} was not found in the dictionary", denormalize(word))?;
            return Ok(());
        }
        let mut lists = self.lists();
        lists[category.index()].push(word.to_string());
        self.rebuild(lists)
    }

    fn remove_word(&mut self, word: &str) -> Result<()> {
        let mut lists = self.lists();
        for list in lists.iter_mut() {
            list.retain(|w| w != word);
        }
        self.rebuild(lists)
    }

    fn suggest<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Thinking...")?;
        let results = self.bot.best_clues(DEFAULT_CLUE_COUNT);
        let Some(best) = results.first() else {
            writeln!(out, "Not a clue.")?;
            return Ok(());
        };
        print_valuation(out, &best.word, &best.breakdown)?;

        let engine = self.bot.engine();
        for (i, result) in results.iter().enumerate() {
            let stat = engine.stat(result.handle);
            writeln!(
                out,
                "{}\t{:.3}\t{:.3}\t{} {}",
                i + 1,
                result.score,
                stat,
                result.word,
                result.count
            )?;
        }
        writeln!(out)?;

        let popularity = engine.popularity(best.handle);
        writeln!(
            out,
            "The best clue found is {} {}",
            denormalize(&best.word).bold(),
            best.count
        )?;
        writeln!(
            out,
            "{} is the {}{} most popular word",
            best.word,
            popularity,
            order_suffix(popularity)
        )?;
        Ok(())
    }

    fn score<W: Write>(&self, word: &str, out: &mut W) -> Result<()> {
        if !self.bot.engine().word_exists(word) {
            writeln!(out, "{} was not found in the dictionary", denormalize(word))?;
            return Ok(());
        }
        let result = self.bot.score_word(word)?;
        print_valuation(out, word, &result.breakdown)?;
        writeln!(
            out,
            "{} {} has score {}",
            denormalize(word),
            result.count,
            result.score
        )?;
        Ok(())
    }

    fn similar<W: Write>(&self, word: &str, out: &mut W) -> Result<()> {
        if !self.bot.engine().word_exists(word) {
            writeln!(out, "{} does not occur in the corpus", denormalize(word))?;
            return Ok(());
        }
        for (other, sim) in self.bot.similar_words(word, SIMILAR_WORD_COUNT)? {
            writeln!(out, "{:.6}\t{}", sim, denormalize(&other))?;
        }
        Ok(())
    }

    fn print_board<W: Write>(&self, out: &mut W) -> Result<()> {
        let headings = ["My spies:", "Opponent spies:", "Civilians:", "Assassins:"];
        for (heading, category) in headings.iter().zip(Category::ALL) {
            write!(out, "{}", heading)?;
            for word in self.bot.board().texts(category) {
                write!(out, " {}", denormalize(word))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

fn print_valuation<W: Write>(out: &mut W, word: &str, valuation: &[ValuationItem]) -> Result<()> {
    writeln!(out, "Printing statistics for \"{}\"", denormalize(word))?;
    for item in valuation {
        let tag = format!("({})", item.category);
        let tag = match item.category {
            Category::Own => tag.green(),
            Category::Opponent => tag.red(),
            Category::Civilian => tag.dark_grey(),
            Category::Assassin => tag.magenta().bold(),
        };
        writeln!(out, "{:.6}\t{} {}", item.similarity, denormalize(&item.word), tag)?;
    }
    writeln!(out)?;
    Ok(())
}

fn print_help<W: Write>(out: &mut W) -> Result<()> {
    let lines = [
        "r <word>\t-\tAdd a red spy to the board",
        "b <word>\t-\tAdd a blue spy to the board",
        "c <word>\t-\tAdd a civilian to the board",
        "a <word>\t-\tAdd an assassin to the board",
        "- <word>\t-\tRemove a word from the board",
        "go\t\t-\tReceive clues",
        "reset\t\t-\tClear the board",
        "board\t\t-\tPrints the words currently on the board",
        "score <word>\t-\tCompute how good a given clue would be",
        "similar <word>\t-\tList the closest words in the vocabulary",
        "quit\t\t-\tTerminates the program",
    ];
    writeln!(out, "The following commands are available:")?;
    writeln!(out)?;
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::persistence::EdgeListFile;
    use crate::similarity::EdgeListEngine;

    fn session(color: TeamColor) -> GameSession<EdgeListEngine> {
        let engine = EdgeListEngine::from_file(EdgeListFile {
            format_version: 1,
            words: ["cat", "dog", "kitten", "ice_cream", "bone"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            edges: vec![(0, 2, 0.9), (0, 1, 0.5), (1, 4, 0.8)],
        });
        GameSession::new(ClueBot::new(engine, ScoringConfig::default()), color)
    }

    fn run(session: &mut GameSession<EdgeListEngine>, line: &str) -> String {
        let mut out = Vec::new();
        if let Some(cmd) = Command::parse(line, session.color()) {
            session.execute(cmd, &mut out).unwrap();
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn colours_parse_loosely() {
        assert_eq!(TeamColor::parse(" Blue "), Some(TeamColor::Blue));
        assert_eq!(TeamColor::parse("r"), Some(TeamColor::Red));
        assert_eq!(TeamColor::parse("green"), None);
        assert_eq!(TeamColor::Blue.letter_for(Category::Opponent), 'r');
    }

    #[test]
    fn card_letters_depend_on_own_colour() {
        let red = TeamColor::Red;
        assert_eq!(Command::parse("r cat", red), Some(Command::Add(Category::Own, "cat".into())));
        assert_eq!(Command::parse("b cat", red), Some(Command::Add(Category::Opponent, "cat".into())));
        assert_eq!(
            Command::parse("B Ice Cream", TeamColor::Blue),
            Some(Command::Add(Category::Own, "ice_cream".into()))
        );
        assert_eq!(Command::parse("g dog", red), Some(Command::Add(Category::Civilian, "dog".into())));
        assert_eq!(Command::parse("a dog", red), Some(Command::Add(Category::Assassin, "dog".into())));
        assert_eq!(Command::parse("a", red), Some(Command::MissingWord("a".into())));
        assert_eq!(Command::parse("PLAY", red), Some(Command::Suggest));
        assert_eq!(Command::parse("dance", red), Some(Command::Unknown("dance".into())));
        assert_eq!(Command::parse("   ", red), None);
    }

    #[test]
    fn unknown_words_do_not_touch_the_board() {
        let mut s = session(TeamColor::Red);
        let out = run(&mut s, "r volcano");
        assert!(out.contains("volcano was not found in the dictionary"));
        assert!(s.bot().board().is_empty());
    }

    #[test]
    fn add_remove_and_reset() {
        let mut s = session(TeamColor::Red);
        run(&mut s, "r cat");
        run(&mut s, "b dog");
        run(&mut s, "c ice cream");
        let board = run(&mut s, "board");
        assert!(board.contains("My spies: cat"));
        assert!(board.contains("Opponent spies: dog"));
        assert!(board.contains("Civilians: ice cream"));

        run(&mut s, "- dog");
        assert!(s.bot().board().texts(Category::Opponent).is_empty());
        assert_eq!(s.bot().board().words().len(), 2);

        run(&mut s, "reset");
        assert!(s.bot().board().is_empty());
    }

    #[test]
    fn go_suggests_the_best_clue() {
        let mut s = session(TeamColor::Blue);
        run(&mut s, "b cat");
        let out = run(&mut s, "go");
        assert!(out.starts_with("Thinking..."));
        assert!(out.contains("kitten 1"));
        assert!(out.contains("is the 3rd most popular word"));
    }

    #[test]
    fn go_reports_the_ranked_entry_of_a_repeated_word() {
        // The second "kitten" wins text lookups but has no edges.
        let engine = EdgeListEngine::from_file(EdgeListFile {
            format_version: 1,
            words: ["cat", "kitten", "kitten"].iter().map(|w| w.to_string()).collect(),
            edges: vec![(0, 1, 0.9)],
        });
        let mut s = GameSession::new(ClueBot::new(engine, ScoringConfig::default()), TeamColor::Red);
        run(&mut s, "r cat");
        let out = run(&mut s, "go");
        assert!(out.contains("The best clue found is"));
        assert!(out.contains("kitten is the 2nd most popular word"));
    }

    #[test]
    fn score_and_similar_commands() {
        let mut s = session(TeamColor::Blue);
        run(&mut s, "b cat");
        let out = run(&mut s, "score kitten");
        assert!(out.contains("Printing statistics for \"kitten\""));
        assert!(out.contains("kitten 1 has score"));

        let out = run(&mut s, "similar cat");
        let first = out.lines().next().unwrap();
        assert!(first.ends_with("kitten"));

        let out = run(&mut s, "score lava");
        assert!(out.contains("lava was not found"));
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut s = session(TeamColor::Red);
        let mut out = Vec::new();
        let flow = s.execute(Command::Quit, &mut out).unwrap();
        assert_eq!(flow, Flow::Quit);
    }
}
