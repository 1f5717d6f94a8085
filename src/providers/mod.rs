pub mod coinmarketcap;
