//! Parser for graphs in a subset of nauty's dreadnaut syntax:
//!
//! ```text
//! d                  (optional, arcs instead of edges)
//! n=4 g
//! 0:1 2 ;
//! 2:3.
//! f=[0|1,2] x o      (optional colouring)
//! ```

use crate::{
    graph::{Colour, ColouredGraph, DEFAULT_COLOR},
    Error,
};

pub type Input<'a> = &'a str;
pub type ParseError<'a> = nom::error::VerboseError<Input<'a>>;
pub type ParseResult<'a, O> = nom::IResult<Input<'a>, O, ParseError<'a>>;

/// Dreadnaut's `d` command switches to digraph input.
fn parse_digraph_flag(input: Input<'_>) -> ParseResult<'_, bool> {
    use nom::{
        bytes::complete::tag,
        character::complete::{multispace0, space0},
        combinator::opt,
        error::context,
        sequence::tuple,
    };

    let (rest, _) = multispace0(input)?;
    let (rest, flag) = context(
        "Digraph flag",
        opt(tuple((tag("d"), space0, multispace0))),
    )(rest)?;
    Ok((rest, flag.is_some()))
}

/// Parse the start line for the graph that contains the size.
fn parse_graph_size(input: Input<'_>) -> ParseResult<'_, usize> {
    use nom::{
        bytes::complete::tag,
        character::complete::{digit1, multispace0, space0},
        combinator::map_res,
        error::context,
        sequence::tuple,
    };

    let mut size_header = context(
        "Graph size header",
        tuple((
            tag("n="),
            map_res(digit1, str::parse::<usize>),
            space0,
            tag("g"),
            multispace0,
        )),
    );
    let (rest, (_, graph_size, _, _, _)) = size_header(input)?;
    Ok((rest, graph_size))
}

/// Parse a single vertex index.
fn parse_vertex_index(input: Input<'_>) -> ParseResult<'_, usize> {
    use nom::{character::complete::digit1, combinator::map_res};
    map_res(digit1, str::parse::<usize>)(input)
}

/// Parse the edges from vertex s from `s:e1 e2 e3 ... en`.
fn parse_vertex_edges(
    graph_size: usize,
    input: Input<'_>,
) -> ParseResult<'_, (usize, Vec<usize>)> {
    use nom::{
        bytes::complete::tag,
        character::complete::{space0, space1},
        combinator::verify,
        error::context,
        multi::separated_list0,
    };

    let (input, index) = context(
        "lines starts with vertex index",
        verify(parse_vertex_index, |index| *index < graph_size),
    )(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, _) = space0(input)?;

    let (rest, edges) = context(
        "List of edges from this vertex",
        separated_list0(
            space1,
            verify(parse_vertex_index, |end_index| *end_index < graph_size),
        ),
    )(input)?;

    Ok((rest, (index, edges)))
}

/// Parse the end of a edge line which determines
/// if the edge lines stop early (`.`) or continue (`;`).
fn parse_continue_after_edge_line(input: Input<'_>) -> ParseResult<'_, bool> {
    use nom::{
        branch::alt,
        bytes::complete::tag,
        character::complete::{multispace0, space0},
        combinator::map,
        sequence::{preceded, terminated},
    };

    let edge_list_end = preceded(space0, alt((tag(";"), tag("."))));
    let edge_line_end = terminated(edge_list_end, multispace0);
    let mut should_continue_after_line = map(edge_line_end, |end: &str| end == ";");

    should_continue_after_line(input)
}

/// Parse the colouring (i.e. the partition of the vertices). The input looks like this:
/// `f=[c11,c12.c13,...c1n|c21,c22,...c2m|...|cp1,cp2,...,cpk]`
/// Not specified vertices stay in colour DEFAULT_COLOR.
/// Whatever follows the closing bracket is ignored.
fn parse_colouring(graph_size: usize, input: Input<'_>) -> ParseResult<'_, Vec<Colour>> {
    use nom::{
        bytes::complete::tag,
        character::complete::space0,
        combinator::verify,
        error::context,
        multi::{separated_list0, separated_list1},
        sequence::tuple,
    };

    let mut colours = vec![DEFAULT_COLOR; graph_size];
    let mut colour_counter = 1;

    let sep = |sep_tag| tuple((space0, tag(sep_tag), space0));

    let single_colour = separated_list1(
        sep(","),
        verify(parse_vertex_index, |vertex| *vertex < graph_size),
    );
    let mut colour_list = context("Colouring", separated_list0(sep("|"), single_colour));

    let (input, _) = tuple((tag("f=["), space0))(input)?;
    let (input, colour_list) = colour_list(input)?;
    let (rest, _) = tuple((space0, tag("]")))(input)?;

    for colour in colour_list {
        for vertex in colour {
            colours[vertex] = colour_counter;
        }
        colour_counter += 1;
    }

    Ok((rest, colours))
}

/// Without a colouring only whitespace may follow the edge lines.
fn parse_end_of_input(input: Input<'_>) -> ParseResult<'_, ()> {
    use nom::{
        character::complete::multispace0,
        combinator::{eof, value},
        error::context,
        sequence::preceded,
    };

    context("End of graph", value((), preceded(multispace0, eof)))(input)
}

pub fn parse_dreadnaut_input(input: Input<'_>) -> Result<ColouredGraph, Error> {
    let (input, directed) = parse_digraph_flag(input)?;
    let (mut input, graph_size) = parse_graph_size(input)?;
    let mut graph = ColouredGraph::new(graph_size);

    while graph_size > 0 {
        let (rest, (vertex, edges)) = parse_vertex_edges(graph_size, input)?;

        for end in edges {
            if directed {
                graph.add_arc(vertex, end)?;
            } else {
                graph.add_edge(vertex, end)?;
            }
        }

        let (rest, should_continue) = parse_continue_after_edge_line(rest)?;
        input = rest;

        if !should_continue || vertex >= graph_size - 1 {
            break;
        }
    }

    let input = input.trim_start();
    if input.starts_with("f=") {
        let (_, colours) = parse_colouring(graph_size, input)?;
        graph.set_colours(&colours)?;
    } else {
        parse_end_of_input(input)?;
    }

    Ok(graph)
}
