pub mod ratio_search;
