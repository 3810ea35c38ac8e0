use nalgebra::{Point3, Vector2, Vector3};
use nalgebra_glm::cross2d;

use super::{newell_normal, Edge, FaceId, Mesh};
use crate::error::SliceError;
use crate::geo::EPSILON;

impl Mesh {
    /// Caps a single closed edge loop with triangles.
    ///
    /// The edges must be given in walk order (each edge shares a vertex with the
    /// next) and form one simple cycle. The loop is projected onto the plane of
    /// its Newell normal and triangulated.
    pub fn fill_loop(&mut self, edge_loop:&[Edge]) -> Result<Vec<FaceId>,SliceError> {
        if let Some(edge) = edge_loop.iter().find(|e| !self.has_edge(e)) {
            return Err(SliceError::cap(format!("edge ({},{}) is not part of the mesh",edge.0,edge.1)))
        }
        let ring = loop_vertices(edge_loop)?;
        let points:Vec<Point3<f32>> = ring.iter().map(|v| self.vertices[*v]).collect();

        let normal = newell_normal(&points);
        let Some(normal) = normal.try_normalize(f32::EPSILON) else {
            return Err(SliceError::cap(format!("loop of {} vertices encloses no area",ring.len())))
        };
        let projected = project_onto_plane(&points, &normal);

        let triangles = triangulate(&projected).ok_or_else(||
            SliceError::cap(format!("loop of {} vertices is self intersecting",ring.len()))
        )?;
        let faces = triangles.into_iter()
            .map(|[a,b,c]| self.add_face(vec![ring[a],ring[b],ring[c]]))
            .collect();
        Ok(faces)
    }
}

/// Orders the vertices of a closed loop given as edges in walk order.
pub(crate) fn loop_vertices(edge_loop:&[Edge]) -> Result<Vec<usize>,SliceError> {
    if edge_loop.len() < 3 {
        return Err(SliceError::cap(format!("loop has {} edges, at least 3 are needed",edge_loop.len())))
    }
    let first = edge_loop[0];
    let second = edge_loop[1];
    let start = if second.contains(first.1) { first.0 } else { first.1 };
    let mut current = first.other(start).unwrap_or(first.1);
    let mut ring = vec![start];

    for edge in edge_loop.iter().skip(1) {
        if ring.contains(&current) {
            return Err(SliceError::cap(format!("vertex {current} is visited twice, the loop is not simple")))
        }
        ring.push(current);
        current = edge.other(current).ok_or_else(||
            SliceError::cap(format!("edge ({},{}) does not continue the loop at vertex {current}",edge.0,edge.1))
        )?;
    }
    if current != start {
        return Err(SliceError::cap(format!("loop is open, it ends at vertex {current} instead of {start}")))
    }
    Ok(ring)
}

/// Projects points onto a 2d basis (u,v) with u×v = normal, so loops winding
/// counter clockwise around the normal stay counter clockwise.
fn project_onto_plane(points:&[Point3<f32>], normal:&Vector3<f32>) -> Vec<Vector2<f32>> {
    let helper = if normal.x.abs() <= normal.y.abs() && normal.x.abs() <= normal.z.abs() { Vector3::x() }
        else if normal.y.abs() <= normal.z.abs() { Vector3::y() }
        else { Vector3::z() };
    let u = normal.cross(&helper).normalize();
    let v = normal.cross(&u);
    points.iter()
        .map(|p| Vector2::new(p.coords.dot(&u), p.coords.dot(&v)))
        .collect()
}

/// Triangulates a counter clockwise polygon with earcut, triangles wind like the
/// polygon. Earcut drops vertices lying on a straight run of the outline, so
/// those are taken out first and fanned back into the triangle on their run,
/// leaving every outline edge on exactly one triangle. Returns None if the
/// triangles do not account for every vertex.
fn triangulate(points:&[Vector2<f32>]) -> Option<Vec<[usize;3]>> {
    let (corners,runs) = split_straight_runs(points);
    if corners.len() < 3 { return None }

    let flat:Vec<f32> = corners.iter()
        .flat_map(|v| [points[*v].x, points[*v].y])
        .collect();
    let indices = earcutr::earcut(&flat, &[], 2).ok()?;
    let mut triangles:Vec<[usize;3]> = indices.chunks_exact(3)
        .map(|t| [corners[t[0]],corners[t[1]],corners[t[2]]])
        .collect();

    for (i,run) in runs.iter().enumerate() {
        if run.is_empty() { continue }
        let a = corners[i];
        let b = corners[(i+1)%corners.len()];
        let t = triangles.iter().position(|t| t.contains(&a) && t.contains(&b))?;
        let apex = *triangles[t].iter().find(|v| **v != a && **v != b)?;
        triangles.swap_remove(t);
        let fan:Vec<usize> = std::iter::once(a)
            .chain(run.iter().copied())
            .chain(std::iter::once(b))
            .collect();
        triangles.extend(fan.windows(2).map(|w| [w[0],w[1],apex]));
    }

    for [a,b,c] in triangles.iter_mut() {
        if cross2d(&(points[*b]-points[*a]), &(points[*c]-points[*a])) < 0.0 {
            std::mem::swap(b,c);
        }
    }
    (triangles.len() == points.len()-2).then_some(triangles)
}

/// Splits the outline into corners and, for every corner, the vertices lying on
/// the straight run to the next corner.
fn split_straight_runs(points:&[Vector2<f32>]) -> (Vec<usize>,Vec<Vec<usize>>) {
    let n = points.len();
    let (min,max) = points.iter().fold(
        (Vector2::repeat(f32::MAX),Vector2::repeat(f32::MIN)),
        |(min,max),p| (min.inf(p),max.sup(p))
    );
    let extent = (max-min).max().max(f32::EPSILON);
    let tolerance = EPSILON * extent * extent;

    let mut corners:Vec<usize> = (0..n).collect();
    let mut changed = true;
    while changed {
        changed = false;
        let mut i = 0;
        while i < corners.len() && corners.len() > 3 {
            let m = corners.len();
            let a = points[corners[(i+m-1)%m]];
            let b = points[corners[i]];
            let c = points[corners[(i+1)%m]];
            if cross2d(&(b-a), &(c-b)).abs() <= tolerance && (b-a).dot(&(c-b)) > 0.0 {
                corners.remove(i);
                changed = true;
            } else {
                i += 1;
            }
        }
    }

    let runs = (0..corners.len())
        .map(|j|{
            let end = corners[(j+1)%corners.len()];
            let mut run = Vec::new();
            let mut v = (corners[j]+1)%n;
            while v != end {
                run.push(v);
                v = (v+1)%n;
            }
            run
        })
        .collect();
    (corners,runs)
}

#[test]
fn triangulate_concave_test(){
    // L shape
    let points = vec![
        Vector2::new(0.0,0.0),
        Vector2::new(2.0,0.0),
        Vector2::new(2.0,1.0),
        Vector2::new(1.0,1.0),
        Vector2::new(1.0,2.0),
        Vector2::new(0.0,2.0),
    ];
    let triangles = triangulate(&points).unwrap();
    assert_eq!(triangles.len(),4);
    let areas = signed_areas(&points, &triangles);
    assert!(areas.iter().all(|a| *a > 0.0), "folded triangle in {triangles:?}");
    assert!((areas.iter().sum::<f32>()-3.0).abs() < 1e-5);
}

#[cfg(test)]
fn signed_areas(points:&[Vector2<f32>], triangles:&[[usize;3]]) -> Vec<f32> {
    triangles.iter()
        .map(|[a,b,c]| 0.5*cross2d(&(points[*b]-points[*a]),&(points[*c]-points[*a])))
        .collect()
}

#[test]
fn triangulate_keeps_vertices_on_straight_runs_test(){
    // square with an extra vertex in the middle of every side and two on the top
    let points = vec![
        Vector2::new(0.0,0.0),
        Vector2::new(1.0,0.0),
        Vector2::new(2.0,0.0),
        Vector2::new(2.0,1.0),
        Vector2::new(2.0,2.0),
        Vector2::new(4.0/3.0,2.0),
        Vector2::new(2.0/3.0,2.0),
        Vector2::new(0.0,2.0),
        Vector2::new(0.0,1.0),
    ];
    let triangles = triangulate(&points).unwrap();
    assert_eq!(triangles.len(),points.len()-2);

    let areas = signed_areas(&points, &triangles);
    assert!(areas.iter().all(|a| *a > 0.0), "folded triangle in {triangles:?}");
    assert!((areas.iter().sum::<f32>()-4.0).abs() < 1e-5);

    // every outline edge borders exactly one triangle
    for i in 0..points.len() {
        let (a,b) = (i,(i+1)%points.len());
        let bordering = triangles.iter()
            .filter(|t| t.contains(&a) && t.contains(&b))
            .count();
        assert_eq!(bordering,1,"outline edge ({a},{b})");
    }
}

#[test]
fn triangulate_u_shape_test(){
    let points = vec![
        Vector2::new(0.0,0.0),
        Vector2::new(1.5,0.0),
        Vector2::new(3.0,0.0),
        Vector2::new(3.0,3.0),
        Vector2::new(2.0,3.0),
        Vector2::new(2.0,1.0),
        Vector2::new(1.0,1.0),
        Vector2::new(1.0,3.0),
        Vector2::new(0.0,3.0),
    ];
    let triangles = triangulate(&points).unwrap();
    assert_eq!(triangles.len(),7);
    let areas = signed_areas(&points, &triangles);
    assert!(areas.iter().all(|a| *a > 0.0));
    assert!((areas.iter().sum::<f32>()-7.0).abs() < 1e-5);
}

#[test]
fn loop_vertices_rejects_open_chain_test(){
    let chain = [Edge::new(0,1),Edge::new(1,2),Edge::new(2,3)];
    assert!(matches!(loop_vertices(&chain), Err(SliceError::CapFailure{..})));
    let cycle = [Edge::new(1,0),Edge::new(1,2),Edge::new(2,0)];
    assert_eq!(loop_vertices(&cycle).unwrap(), vec![0,1,2]);
}
