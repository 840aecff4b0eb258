mod parse_matrix;
