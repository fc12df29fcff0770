//! The numbered menu and its dispatch loop.
//!
//! The loop alternates between waiting for a choice and running exactly one
//! database operation. Bad input is reported and re-prompted without touching
//! the database; database errors end the loop and propagate to the caller.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use campus_graph::mutations::LOW_RATING_THRESHOLD;
use campus_graph::queries::{DEFAULT_COURSE_TERM, FEATURED_RATING};
use campus_graph::GraphClient;

/// One entry of the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    LoadData,
    SearchCourses,
    FeaturedInstructors,
    StudentsWithCourses,
    InstructorFollowers,
    DeleteLowRated,
    DropAll,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 8] = [
        Self::LoadData,
        Self::SearchCourses,
        Self::FeaturedInstructors,
        Self::StudentsWithCourses,
        Self::InstructorFollowers,
        Self::DeleteLowRated,
        Self::DropAll,
        Self::Exit,
    ];

    pub fn number(self) -> i64 {
        match self {
            Self::LoadData => 1,
            Self::SearchCourses => 2,
            Self::FeaturedInstructors => 3,
            Self::StudentsWithCourses => 4,
            Self::InstructorFollowers => 5,
            Self::DeleteLowRated => 6,
            Self::DropAll => 7,
            Self::Exit => 8,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LoadData => "Load data",
            Self::SearchCourses => "Query by course title (text index)",
            Self::FeaturedInstructors => "Query by instructor rating (numeric index)",
            Self::StudentsWithCourses => "Show students and their courses",
            Self::InstructorFollowers => "Show instructor followers (reverse)",
            Self::DeleteLowRated => "Delete instructors with low rating",
            Self::DropAll => "Drop all",
            Self::Exit => "Exit",
        }
    }
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -- {}", self.number(), self.label())
    }
}

/// Why a line of input did not select a menu entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChoiceError {
    #[error("Invalid input. Please enter a number.")]
    NotANumber,

    /// A number, possibly one too large for any integer type, that names no
    /// entry.
    #[error("Invalid choice. Please try again.")]
    Unknown(String),
}

impl TryFrom<i64> for MenuChoice {
    type Error = ChoiceError;

    fn try_from(number: i64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|choice| choice.number() == number)
            .ok_or_else(|| ChoiceError::Unknown(number.to_string()))
    }
}

impl FromStr for MenuChoice {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.parse::<i64>() {
            Ok(number) => Self::try_from(number),
            Err(_) if is_integer(trimmed) => Err(ChoiceError::Unknown(trimmed.to_string())),
            Err(_) => Err(ChoiceError::NotANumber),
        }
    }
}

/// An optionally signed run of ASCII digits, of any length.
fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Loop state: waiting for input, running one choice, or finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Dispatch(MenuChoice),
    Exited,
}

/// Write the menu listing.
pub fn print_menu<W: Write>(out: &mut W) -> std::io::Result<()> {
    for choice in MenuChoice::ALL {
        writeln!(out, "{choice}")?;
    }
    Ok(())
}

/// Drive the menu until the user exits or input ends, then release the
/// client. Any database error stops the loop and is returned.
pub async fn run_menu<R, W>(client: GraphClient, input: R, out: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut state = State::Idle;

    loop {
        state = match state {
            State::Idle => {
                print_menu(out)?;
                write!(out, "Enter your choice: ")?;
                out.flush()?;

                match lines.next_line().await? {
                    None => {
                        writeln!(out)?;
                        State::Dispatch(MenuChoice::Exit)
                    }
                    Some(line) => match line.parse::<MenuChoice>() {
                        Ok(choice) => State::Dispatch(choice),
                        Err(e) => {
                            writeln!(out, "{e}")?;
                            State::Idle
                        }
                    },
                }
            }
            State::Dispatch(choice) => {
                tracing::debug!(choice = choice.number(), "Dispatching menu choice");
                execute(&client, choice, out).await?;
                if choice == MenuChoice::Exit {
                    State::Exited
                } else {
                    State::Idle
                }
            }
            State::Exited => break,
        };
    }

    client.close();
    Ok(())
}

/// Run one menu entry against the database and print its result.
pub async fn execute<W: Write>(
    client: &GraphClient,
    choice: MenuChoice,
    out: &mut W,
) -> anyhow::Result<()> {
    match choice {
        MenuChoice::LoadData => {
            let uids = client.load_sample_data().await?;
            writeln!(out, "Data loaded. UIDs: {}", serde_json::to_string(&uids)?)?;
        }
        MenuChoice::SearchCourses => {
            let data = client.search_courses(DEFAULT_COURSE_TERM).await?;
            print_json(out, &data)?;
        }
        MenuChoice::FeaturedInstructors => {
            let data = client.instructors_rated_at_least(FEATURED_RATING).await?;
            print_json(out, &data)?;
        }
        MenuChoice::StudentsWithCourses => {
            let data = client.students_with_courses().await?;
            print_json(out, &data)?;
        }
        MenuChoice::InstructorFollowers => {
            let data = client.instructor_followers().await?;
            print_json(out, &data)?;
        }
        MenuChoice::DeleteLowRated => {
            let deleted = client.delete_instructors_below(LOW_RATING_THRESHOLD).await?;
            writeln!(
                out,
                "Deleted {} instructor(s) with rating < {LOW_RATING_THRESHOLD:.1}",
                deleted.len()
            )?;
        }
        MenuChoice::DropAll => {
            client.drop_all().await?;
            writeln!(out, "All schema and data dropped")?;
        }
        MenuChoice::Exit => {
            writeln!(out, "Exiting...")?;
        }
    }
    Ok(())
}

fn print_json<W: Write>(out: &mut W, data: &Value) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(data)?)?;
    Ok(())
}
