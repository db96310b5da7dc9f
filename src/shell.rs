// Front-desk command shell
//
// One command per line, double quotes group words:
//   search 김민서
//   loan 1 우산 S123 Kim
//   return 1 Park

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{anyhow, Result};
use guest_loans::{LoanRecord, RentalService};

const HELP: &str = "\
commands:
  import <path>                        load a roster (.xml or .csv)
  alias <canonical> <alias>            add an alternate spelling
  aliases [canonical]                  show registered spellings
  search <canonical>                   find guests by native-script name
  loan <result#> <item|item#> <serial> <staff>
                                       lend an item to a search result
  return <loan#> <staff>               record a return
  list | open                          all loans | open loans
  items                                loanable items
  help | quit";

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<'a> {
    service: &'a RentalService,
}

impl<'a> Shell<'a> {
    pub fn new(service: &'a RentalService) -> Self {
        Shell { service }
    }

    /// Read commands until EOF or `quit`
    pub fn run<R: BufRead, W: Write>(&self, input: R, output: &mut W) -> Result<()> {
        writeln!(output, "guest-loans {} - type 'help' for commands", guest_loans::VERSION)?;
        for line in input.lines() {
            let line = line?;
            match self.execute(&line, output) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(err) => writeln!(output, "error: {}", err)?,
            }
        }
        Ok(())
    }

    pub fn execute<W: Write>(&self, line: &str, out: &mut W) -> Result<Flow> {
        let args = tokenize(line)?;
        let Some((command, rest)) = args.split_first() else {
            return Ok(Flow::Continue);
        };

        match (command.as_str(), rest) {
            ("quit" | "exit", _) => return Ok(Flow::Quit),
            ("help", _) => writeln!(out, "{}", HELP)?,
            ("import", [path]) => {
                let count = self.service.import_roster_file(Path::new(path))?;
                writeln!(out, "imported {} guest(s)", count)?;
            }
            ("alias", [canonical, alias]) => {
                self.service.add_alias(canonical, alias)?;
                let aliases = self.service.aliases().resolve(canonical);
                writeln!(out, "{}: {}", canonical.trim(), aliases.join(", "))?;
            }
            ("aliases", []) => {
                for (canonical, aliases) in self.service.aliases().snapshot() {
                    writeln!(out, "{}: {}", canonical, aliases.join(", "))?;
                }
            }
            ("aliases", [canonical]) => {
                let aliases = self.service.aliases().resolve(canonical);
                writeln!(out, "{}: {}", canonical.trim(), aliases.join(", "))?;
            }
            ("search", [query]) => {
                let results = self.service.search(query);
                if results.is_empty() {
                    writeln!(out, "no guests found")?;
                }
                for (i, guest) in results.iter().enumerate() {
                    writeln!(
                        out,
                        "[{}] {}  room {}  checkout {}",
                        i + 1,
                        guest.name,
                        guest.room,
                        guest.checkout_date
                    )?;
                }
            }
            ("loan", [result, item, serial, staff]) => {
                let guest = self
                    .service
                    .last_results()
                    .get(parse_number(result)?.wrapping_sub(1))
                    .cloned()
                    .ok_or_else(|| anyhow!("no search result #{}", result))?;
                let item = self.resolve_item(item);
                let loan = self.service.register_loan(&guest, &item, serial, staff)?;
                writeln!(out, "{}", format_loan(&loan))?;
            }
            ("return", [loan_id, staff]) => {
                let loan = self.service.return_loan(parse_number(loan_id)? as u64, staff)?;
                writeln!(out, "{}", format_loan(&loan))?;
            }
            ("list", []) => write_loans(out, &self.service.list_loans())?,
            ("open", []) => write_loans(out, &self.service.open_loans())?,
            ("items", []) => {
                for (i, item) in self.service.catalog().items().iter().enumerate() {
                    writeln!(out, "{}. {}", i + 1, item)?;
                }
            }
            (other, _) => {
                return Err(anyhow!(
                    "unknown command or wrong arguments: {} (try 'help')",
                    other
                ))
            }
        }

        Ok(Flow::Continue)
    }

    /// `2` picks the second catalog item, anything else is taken literally
    fn resolve_item(&self, item: &str) -> String {
        item.parse::<usize>()
            .ok()
            .and_then(|n| self.service.catalog().by_number(n))
            .unwrap_or(item)
            .to_string()
    }
}

fn parse_number(text: &str) -> Result<usize> {
    text.trim()
        .trim_start_matches('#')
        .parse()
        .map_err(|_| anyhow!("not a number: {}", text))
}

fn format_loan(loan: &LoanRecord) -> String {
    let mut line = format!(
        "#{} {} (room {}) - {} [{}] by {} on {} - {}",
        loan.id,
        loan.guest_name,
        loan.room,
        loan.item,
        loan.serial_number,
        loan.issuing_staff,
        loan.loan_date,
        loan.status
    );
    if let (Some(staff), Some(date)) = (&loan.returning_staff, loan.return_date) {
        line.push_str(&format!(" by {} on {}", staff, date));
    }
    line
}

fn write_loans<W: Write>(out: &mut W, loans: &[LoanRecord]) -> Result<()> {
    if loans.is_empty() {
        writeln!(out, "no loans")?;
    }
    for loan in loans {
        writeln!(out, "{}", format_loan(loan))?;
    }
    Ok(())
}

/// Split on whitespace, keeping "double quoted" runs together
fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if quoted {
        return Err(anyhow!("unterminated quote"));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
