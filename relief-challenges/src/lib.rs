pub mod helicopter_relief;
