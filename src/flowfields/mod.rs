//! Flowfields are a means of handling pathfinding for a crowd of actors.
//!
//! [Fixing Pathfinding Once and For All](https://web.archive.org/web/20150905073624/http://www.ai-blog.net/archives/000152.html)
//!
//! [SupCom2- Elijah Emerson](https://www.gameaipro.com/GameAIPro/GameAIPro_Chapter23_Crowd_Pathfinding_and_Steering_Using_Flow_Field_Tiles.pdf)
//!
//! [leifnode](https://leifnode.com/2013/12/flow-field-pathfinding/)
//!
//! Rather than every actor searching for its own path, one field is computed
//! per set of targets and shared by every actor heading there. Each actor
//! simply reads the vector of the cell it stands in.
//!
//! Definitions:
//!
//! * Grid - a `width x height` arrangement of tiles. Each tile has a movement
//! cost where `255` represents impassable terrain (a wall) and `1 - 254` the
//! cost of moving into it, `1` being the default and easiest. Tiles also carry
//! a terrain category and the grid records how many actors occupy each cell
//! during the current tick
//! * Cost field - for every cell the cheapest accumulated cost of travelling
//! to the nearest target, taking into account congestion and a preferred
//! terrain. Multiple targets are expanded from simultaneously
//! * Flow field - for every cell a unit vector pointing at the neighbour with
//! the lowest cost, or the zero vector for walls, targets and cells that
//! can't reach a target
//!
//! ```text
//!  _______________________________
//! |     |     |     |     |     |
//! |  →  |  →  |  →  |  ↓  |  ↙  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  ↗  |  ↑  |  X  |  ↓  |  ↙  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  ↗  |  ↑  |  X  |  T  |  ←  |
//! |_____|_____|_____|_____|_____|
//! ```
//!
//! Diagonal moves are never allowed to squeeze past the corner of a wall, so
//! actors west of the wall `X` route over the top of it.
//!

pub mod fields;
pub mod generator;
pub mod grid;
pub mod utilities;
pub mod weights;
