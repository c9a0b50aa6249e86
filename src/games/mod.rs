//! Game implementations hosted by the bot.

pub mod tictactoe;
