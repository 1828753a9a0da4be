// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command};

fn id_arg(name: &'static str) -> Arg {
    Arg::new(name).long(name).required(true)
}

fn rate_arg() -> Arg {
    Arg::new("rate")
        .long("rate")
        .help("Present balances in this currency")
}

fn draft_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("description").long("description").default_value(""))
        .arg(Arg::new("value").long("value").required(true))
        .arg(
            Arg::new("type")
                .long("type")
                .required(true)
                .help("INCOME or EXPENSE"),
        )
        .arg(
            Arg::new("category")
                .long("category")
                .action(ArgAction::Append)
                .help("Category id; repeat for several"),
        )
}

pub fn build_cli() -> Command {
    command!()
        .name("fin")
        .about("Personal accounts ledger with multi-currency balances")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Database file (overrides FIN_DB)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print results as JSON"),
        )
        .subcommand(Command::new("migrate").about("Apply the database schema"))
        .subcommand(
            Command::new("scrape")
                .about("Fetch and record the latest exchange rates")
                .arg(
                    Arg::new("if-empty")
                        .long("if-empty")
                        .action(ArgAction::SetTrue)
                        .help("Only run when no currencies exist yet"),
                )
                .arg(
                    Arg::new("currency")
                        .long("currency")
                        .help("Refresh a single currency"),
                ),
        )
        .subcommand(
            Command::new("currency")
                .about("Currencies and their latest rates")
                .subcommand_required(true)
                .subcommand(Command::new("list"))
                .subcommand(Command::new("get").arg(Arg::new("code").required(true))),
        )
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand_required(true)
                .subcommand(Command::new("list").arg(rate_arg()))
                .subcommand(Command::new("get").arg(id_arg("id")).arg(rate_arg()))
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("currency").long("currency").required(true))
                        .arg(
                            Arg::new("initial-balance")
                                .long("initial-balance")
                                .required(true),
                        ),
                )
                .subcommand(
                    Command::new("rename")
                        .arg(id_arg("id"))
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("currency").long("currency")),
                )
                .subcommand(Command::new("rm").arg(id_arg("id"))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand_required(true)
                .subcommand(Command::new("list"))
                .subcommand(Command::new("get").arg(id_arg("id")))
                .subcommand(Command::new("add").arg(Arg::new("name").long("name").required(true)))
                .subcommand(
                    Command::new("rename")
                        .arg(id_arg("id"))
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(Command::new("rm").arg(id_arg("id"))),
        )
        .subcommand(
            Command::new("tx")
                .about("Manage an account's transactions")
                .subcommand_required(true)
                .subcommand(Command::new("list").arg(id_arg("account")))
                .subcommand(Command::new("get").arg(id_arg("account")).arg(id_arg("id")))
                .subcommand(draft_args(Command::new("add").arg(id_arg("account"))))
                .subcommand(draft_args(
                    Command::new("update").arg(id_arg("account")).arg(id_arg("id")),
                ))
                .subcommand(Command::new("rm").arg(id_arg("account")).arg(id_arg("id"))),
        )
}
